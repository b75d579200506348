fn main() -> anyhow::Result<()> {
    veilcast::app::run()
}
