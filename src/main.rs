fn main() {
    crashdrop::run();
}
