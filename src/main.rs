fn main() -> anyhow::Result<()> {
    let app = tplgen::cli::parse();
    tplgen::logging::init(app.verbose);
    tplgen::runner::run(app)
}
