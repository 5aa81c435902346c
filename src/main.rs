use nostalgia::Settings;

fn main() -> anyhow::Result<()> {
    nostalgia::run(Settings::default())
}
