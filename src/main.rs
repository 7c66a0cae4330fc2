fn main() -> anyhow::Result<()> {
    minic_driver::main()
}
