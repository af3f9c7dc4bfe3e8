fn main() {
    pollination_fun::run();
}
