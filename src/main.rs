use std::env;
use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use log::debug;

use taquilla::config::Config;
use taquilla::data;
use taquilla::desk::{Desk, Notice, NoticeKind};
use taquilla::sales::ledger::Ledger;
use taquilla::storage::{FileStore, Store};

const USAGE: &str = "Usage: taquilla <command>

Commands:
  add <client> <vip|butacas|generales> <quantity>
  delete <id> [--yes]
  list
  summary
  export";

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success => println!("{}", notice.message),
        NoticeKind::Error => eprintln!("{}", notice.message),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_table(desk: &Desk) {
    let rows = desk.rows();
    if rows.is_empty() {
        println!("No sales recorded");
        return;
    }

    println!("{:>6}  {:<24} {:<10} {:>8} {:>10}", "ID", "Client", "Category", "Tickets", "Total");
    for row in rows {
        println!(
            "{:>6}  {:<24} {:<10} {:>8} {:>10}",
            row.id, row.client_name, row.category, row.quantity, row.total
        );
    }
}

fn print_summary(desk: &Desk) {
    let summary = desk.summary();
    println!("VIP:       {}", summary.vip);
    println!("Butacas:   {}", summary.butacas);
    println!("Generales: {}", summary.generales);
    println!("Total tickets: {}", summary.overall.quantity);
    println!("Total amount:  {}", summary.overall.amount);
}

/// Flags accepted after `delete <id>`. `None` for anything but `--yes`.
fn assume_yes(flags: &[String]) -> Option<bool> {
    match flags {
        [] => Some(false),
        [flag] if flag == "--yes" => Some(true),
        _ => None,
    }
}

fn run(desk: &mut Desk, args: &[String]) -> Result<bool> {
    match args {
        [cmd, name, category, quantity] if cmd == "add" => {
            let result = desk.submit_sale(name, category, quantity);
            print_notice(&Notice::sale_recorded(&result));
            Ok(result.is_ok())
        },
        [cmd, id, rest @ ..] if cmd == "delete" => {
            let id: u64 = match id.parse() {
                Ok(id) => id,
                Err(_) => bail!("invalid sale id: {}", id),
            };

            let Some(skip_prompt) = assume_yes(rest) else {
                eprintln!("{USAGE}");
                return Ok(false);
            };

            if !skip_prompt && !confirm("Are you sure you want to delete this sale?")? {
                debug!("delete of sale {} cancelled", id);
                return Ok(true);
            }

            let result = desk.request_delete(id);
            print_notice(&Notice::sale_deleted(&result));
            Ok(result.is_ok())
        },
        [cmd] if cmd == "list" => {
            print_table(desk);
            Ok(true)
        },
        [cmd] if cmd == "summary" => {
            print_summary(desk);
            Ok(true)
        },
        [cmd] if cmd == "export" => {
            data::export_csv(desk.ledger(), io::stdout())?;
            Ok(true)
        },
        _ => {
            eprintln!("{USAGE}");
            Ok(false)
        },
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }

    let config = Config::from_env();
    debug!("using data directory {}", config.data_dir.display());

    let mut ledger = Ledger::load(Store::from(FileStore::new(config.data_dir)))?;
    let mut desk = Desk::new(&mut ledger);

    if !run(&mut desk, &args)? {
        std::process::exit(1);
    }

    Ok(())
}
