use ember_scene::{GameConfig, flow};

fn main() -> anyhow::Result<()> {
    flow::run(GameConfig::default())
}
