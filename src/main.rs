fn main() -> anyhow::Result<()> {
    gleam::run()
}
