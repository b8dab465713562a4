fn main() {
    appsync_sdl::cli::run();
}
