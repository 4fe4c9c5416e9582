use std::fs;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;

#[path = "src/cli.rs"]
mod cli;

/// Shells whose completion scripts ship next to the man pages.
const SHELLS: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        return Err(io::Error::other("OUT_DIR is not set"));
    };
    let out_dir = Path::new(&out_dir);

    let mut cmd = cli::Cli::command();
    cmd.build();

    write_man_pages(&cmd, &out_dir.join("man"))?;
    write_completions(&mut cmd, &out_dir.join("completions"))
}

/// `strmsync.1` plus one `strmsync-<sub>[-<subsub>].1` page per
/// visible subcommand.
fn write_man_pages(root: &clap::Command, dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut pending = vec![root.clone()];
    while let Some(page) = pending.pop() {
        let name = page.get_name().to_owned();
        pending.extend(
            page.get_subcommands()
                .filter(|sub| !sub.is_hide_set())
                .map(|sub| sub.clone().name(format!("{name}-{}", sub.get_name()))),
        );

        let mut roff = Vec::new();
        clap_mangen::Man::new(page).render(&mut roff)?;
        fs::write(dir.join(format!("{name}.1")), roff)?;
    }
    Ok(())
}

fn write_completions(cmd: &mut clap::Command, dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for shell in SHELLS {
        clap_complete::generate_to(shell, cmd, "strmsync", dir)?;
    }
    Ok(())
}
