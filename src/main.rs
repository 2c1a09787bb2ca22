fn main() {
    sera::run()
}
