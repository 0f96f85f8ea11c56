fn main() -> anyhow::Result<()> {
    hexar_lib::run()
}
