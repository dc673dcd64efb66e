fn main() -> anyhow::Result<()> {
    slicer_replay::cli::run()
}
