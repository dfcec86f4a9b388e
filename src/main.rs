use particle_field::run;

fn main() -> anyhow::Result<()> {
    run()
}
