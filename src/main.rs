use anyhow::Result;
use humansize::{format_size, BINARY};

use oom_alloc::meminfo::report_committed;
use oom_alloc::region::Region;
use oom_alloc::{cli, workers, Config};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mode = match cli::mode_from(std::env::args()) {
        Ok(mode) => mode,
        Err(_) => {
            let prog = std::env::args()
                .next()
                .unwrap_or_else(|| "oom_alloc".to_string());
            eprintln!("{} [ --shared | --private ]", prog);
            std::process::exit(1);
        }
    };
    let config = Config::default();

    println!("Committed_AS demo: anonymous memory allocation and forking");
    println!(
        "(allocate {} {} anonymous, fork {} children)",
        format_size(config.region_bytes, BINARY),
        mode.as_str(),
        config.children
    );

    report_committed("initial state")?;

    let mut region = Region::map_anonymous(config.region_bytes, mode)?;
    report_committed("parent mem allocated")?;

    region.fill_words();
    report_committed("parent mem initialized")?;

    region.set_readonly()?;
    report_committed("parent mem set-readonly")?;

    workers::spawn_sleepers(config.children, config.child_nap)?;
    report_committed("parent forked children")?;

    workers::reap(config.children)?;
    report_committed("parent reaped children")?;

    region.unmap()?;
    report_committed("parent mem unmapped")?;

    Ok(())
}
