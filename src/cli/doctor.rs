//! Doctor command - check external tools

use anyhow::Result;
use console::style;
use pkg_abidiff::config::{user_config_path, AbidiffConfig, CONFIG_FILE};
use pkg_abidiff::tools::find_tool;
use pkg_abidiff::tools::versions::{
    dump_version, require_version, ABI_CC_MIN_VERSION, ABI_DUMPER_MIN_VERSION,
};

/// Programs used to read and unpack packages
const PACKAGE_TOOLS: &[(&str, &str)] = &[
    ("rpm", "RPM attributes"),
    ("rpm2cpio", "RPM extraction"),
    ("cpio", "RPM extraction"),
    ("dpkg", "DEB attributes"),
    ("dpkg-deb", "DEB extraction"),
];

fn check_versioned(program: &str, minimum: &str) -> bool {
    match require_version(program, minimum) {
        Ok(found) => {
            println!("{} {}: {}", style("✓").green(), program, found);
            true
        }
        Err(e) => {
            let found = dump_version(program).ok();
            match found {
                Some(_) => println!("{} {}", style("✗").red(), e),
                None => println!(
                    "{} {}: not found (need {} or newer)",
                    style("✗").red(),
                    program,
                    minimum
                ),
            }
            false
        }
    }
}

pub fn run(config: &AbidiffConfig) -> Result<()> {
    println!("🩺 Pkg-ABIdiff Doctor\n");

    let mut ok = true;

    ok &= check_versioned(&config.tools.abi_compliance_checker, ABI_CC_MIN_VERSION);
    ok &= check_versioned(&config.tools.abi_dumper, ABI_DUMPER_MIN_VERSION);

    match find_tool(&config.tools.objdump) {
        Some(path) => println!(
            "{} {}: {}",
            style("✓").green(),
            config.tools.objdump,
            path.display()
        ),
        None => {
            println!(
                "{} {}: not found (SONAME lookup)",
                style("✗").red(),
                config.tools.objdump
            );
            ok = false;
        }
    }

    // Only one package family is needed on a given host
    let mut families = (false, false);
    for (tool, purpose) in PACKAGE_TOOLS {
        match find_tool(tool) {
            Some(path) => {
                println!("{} {}: {}", style("✓").green(), tool, path.display());
                if tool.starts_with("rpm") || *tool == "cpio" {
                    families.0 = true;
                } else {
                    families.1 = true;
                }
            }
            None => println!("○ {}: not found ({})", tool, purpose),
        }
    }
    if !families.0 && !families.1 {
        println!("  Install rpm/cpio or dpkg to read packages");
        ok = false;
    }

    let local = std::path::Path::new(CONFIG_FILE);
    if local.is_file() {
        println!("✓ Config: {}", local.display());
    } else if let Some(user) = user_config_path().filter(|p| p.is_file()) {
        println!("✓ Config: {}", user.display());
    } else {
        println!("○ Config: defaults");
    }

    if ok {
        println!("\n✅ All checks passed!");
    } else {
        println!(
            "\n{}",
            style("Some required tools are missing or too old").yellow()
        );
    }
    Ok(())
}
