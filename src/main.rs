fn main() {
    watchface_lib::run()
}
