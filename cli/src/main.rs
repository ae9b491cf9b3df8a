use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use sheet_cli::{load_sheet, rules_or_default};
use sheet_engine::{
    content, Character, Dice, DiceRoll, ItemId, LevelUpState, NewCharacter, Pool, Rules,
    SneakAttack, Stat,
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum RestKind {
    Short,
    Long,
}

#[derive(Copy, Clone, ValueEnum)]
enum RollKind {
    MainAttack,
    OffAttack,
    MainDamage,
    OffDamage,
    Sneak,
    OffHandSneak,
    Assassinate,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create a level 1 character and write its sheet
    New {
        /// Sheet file to create
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        name: String,
        /// Stat that starts at 16
        #[arg(long)]
        high: Stat,
        /// Stat that starts at 10
        #[arg(long)]
        mid: Stat,
        #[arg(long)]
        race: Option<String>,
        /// Free racial +1, repeat once per choice
        #[arg(long = "choice")]
        choices: Vec<Stat>,
        /// Overwrite an existing sheet
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print a sheet summary
    Show {
        #[arg(long)]
        file: PathBuf,
        /// Print the raw snapshot instead
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Gain a level and put every point into one stat
    LevelUp {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        stat: Stat,
    },
    /// Gain a level and open its point budget
    StartLevelUp {
        #[arg(long)]
        file: PathBuf,
    },
    /// Spend one pending level-up point
    Allocate {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        stat: Stat,
    },
    /// Add an item from a built-in catalog
    AddItem {
        #[arg(long)]
        file: PathBuf,
        /// Catalog item name, case-insensitive
        #[arg(long)]
        item: String,
        #[arg(long, default_value = "starter")]
        catalog: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        enchant: i32,
        /// Equip it right away
        #[arg(long, default_value_t = false)]
        equip: bool,
    },
    Equip {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id: u32,
    },
    Unequip {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id: u32,
    },
    /// Shift an item's enchantment by a delta
    Enchant {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        id: u32,
        #[arg(long, allow_hyphen_values = true)]
        delta: i32,
    },
    /// Spend one point from a resource pool
    Spend {
        #[arg(long)]
        file: PathBuf,
        /// sorcery | finesse | combat-maneuver
        #[arg(long)]
        pool: Pool,
    },
    Rest {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_enum)]
        kind: RestKind,
    },
    /// Edit the stat override layer
    Override {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, requires = "delta")]
        stat: Option<Stat>,
        #[arg(long, requires = "stat", allow_hyphen_values = true)]
        delta: Option<i32>,
        #[arg(long, default_value_t = false)]
        enable: bool,
        #[arg(long, default_value_t = false, conflicts_with = "enable")]
        disable: bool,
        /// Zero every stored delta
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Roll a combat query for a sheet, or a bare dice expression
    Roll {
        #[arg(long, required_unless_present = "dice", requires = "what")]
        file: Option<PathBuf>,
        #[arg(value_enum)]
        what: Option<RollKind>,
        /// Dice expression such as 2d6+3
        #[arg(long, conflicts_with = "file")]
        dice: Option<DiceRoll>,
    },
}

#[derive(Parser)]
#[command(name = "sheet")]
#[command(about = "Character sheet harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// Use average dice instead of rolling
    #[arg(long, global = true, default_value_t = false)]
    average: bool,
    /// RNG seed for determinism
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,
    /// Balance file (YAML or JSON); defaults to the built-in rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Log engine decisions to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn save(path: &Path, character: &Character) -> anyhow::Result<()> {
    fs::write(path, character.to_json()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), level = character.level(), "sheet saved");
    Ok(())
}

/// Load, apply `f`, and write the sheet back if `f` succeeded.
fn update<T>(
    path: &Path,
    rules: &Arc<Rules>,
    f: impl FnOnce(&mut Character) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut character = load_sheet(path, rules)?;
    let out = f(&mut character)?;
    save(path, &character)?;
    Ok(out)
}

fn signed(n: i32) -> String {
    format!("{:+}", n)
}

fn print_sheet(c: &Character) {
    match c.race() {
        Some(race) => println!("{} ({}), level {}", c.name(), race, c.level()),
        None => println!("{}, level {}", c.name(), c.level()),
    }
    let rolls: Vec<String> = c.hp_rolls().iter().map(|r| r.to_string()).collect();
    println!("hp {} [{}]", c.hit_points(), rolls.join(", "));
    let stats: Vec<String> = Stat::ALL
        .iter()
        .map(|&stat| {
            format!(
                "{} {} ({})",
                stat,
                c.effective_stat(stat),
                signed(c.modifier(stat))
            )
        })
        .collect();
    println!("{}", stats.join("  "));
    let overrides = c.stat_overrides();
    if overrides.enabled {
        let deltas: Vec<String> = Stat::ALL
            .iter()
            .map(|&stat| format!("{} {}", stat, signed(overrides.deltas.get(stat))))
            .collect();
        println!("overrides on: {}", deltas.join("  "));
    }
    println!("ac {}", c.armor_class());
    let pools: Vec<String> = Pool::ALL
        .iter()
        .map(|&pool| {
            let p = c.resources().pool(pool);
            format!("{} {}/{}", pool, p.current, p.max)
        })
        .collect();
    println!("{}", pools.join("  "));
    if let LevelUpState::LevelingUp { pending } = c.level_up_state() {
        println!("level-up: {} point(s) pending", pending);
    }
    for item in c.inventory().items() {
        let slot = match (item.slot, item.equipped) {
            (Some(slot), _) => format!(" [{}]", slot),
            (None, true) => " [worn]".to_string(),
            (None, false) => String::new(),
        };
        let enchant = match item.enchantment {
            0 => String::new(),
            e => format!(" {}", signed(e)),
        };
        println!("{} {}{}{}", item.id, item.name, slot, enchant);
    }
}

fn print_sneak(label: &str, hit: Option<SneakAttack>) -> anyhow::Result<()> {
    let Some(hit) = hit else {
        bail!("no weapon in that hand");
    };
    println!(
        "{}: {} ({} extra dice{})",
        label,
        hit.damage,
        hit.extra_dice,
        if hit.spent_point { ", spent a finesse point" } else { "" }
    );
    Ok(())
}

fn roll_query(c: &mut Character, dice: &mut Dice, what: RollKind) -> anyhow::Result<()> {
    let (label, value) = match what {
        RollKind::MainAttack => ("main-hand attack", c.main_hand_attack_roll(dice)),
        RollKind::OffAttack => ("off-hand attack", c.off_hand_attack_roll(dice)),
        RollKind::MainDamage => ("main-hand damage", c.main_hand_damage_roll(dice)),
        RollKind::OffDamage => ("off-hand damage", c.off_hand_damage_roll(dice)),
        RollKind::Sneak => return print_sneak("sneak attack", c.sneak_attack(dice)?),
        RollKind::OffHandSneak => {
            return print_sneak("off-hand sneak attack", c.off_hand_sneak_attack(dice)?)
        }
        RollKind::Assassinate => return print_sneak("assassinate", c.assassinate(dice)?),
    };
    match value {
        Some(total) => println!("{}: {}", label, total),
        None => bail!("no weapon in that hand"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rules = rules_or_default(cli.rules.as_deref())?;
    let mut dice = if cli.average {
        Dice::average()
    } else {
        Dice::from_seed(cli.seed)
    };

    match cli.cmd {
        Cmd::New {
            file,
            name,
            high,
            mid,
            race,
            choices,
            force,
        } => {
            if file.exists() && !force {
                bail!("{} already exists (use --force to replace it)", file.display());
            }
            let mut new = NewCharacter::new(&name, high, mid);
            if let Some(race) = race {
                new = new.with_race(&race, choices);
            } else {
                new.racial_choices = choices;
            }
            let character = Character::create(new, Arc::clone(&rules), &mut dice)?;
            save(&file, &character)?;
            print_sheet(&character);
        }
        Cmd::Show { file, json } => {
            let character = load_sheet(&file, &rules)?;
            if json {
                println!("{}", character.to_json()?);
            } else {
                print_sheet(&character);
            }
        }
        Cmd::LevelUp { file, stat } => {
            update(&file, &rules, |c| {
                if !c.level_up(stat, &mut dice) {
                    bail!("a level-up is already in progress; allocate its points first");
                }
                println!(
                    "level {}: hp {}, {} now {}",
                    c.level(),
                    c.hit_points(),
                    stat,
                    c.base_stats().get(stat)
                );
                Ok(())
            })?;
        }
        Cmd::StartLevelUp { file } => {
            update(&file, &rules, |c| {
                if !c.start_level_up(&mut dice) {
                    bail!("a level-up is already in progress; allocate its points first");
                }
                println!(
                    "level {}: hp {}, {} point(s) to allocate",
                    c.level(),
                    c.hit_points(),
                    c.pending_level_up_points()
                );
                Ok(())
            })?;
        }
        Cmd::Allocate { file, stat } => {
            update(&file, &rules, |c| {
                if !c.allocate_point(stat) {
                    bail!("no level-up in progress");
                }
                println!(
                    "{} now {}, {} point(s) left",
                    stat,
                    c.base_stats().get(stat),
                    c.pending_level_up_points()
                );
                Ok(())
            })?;
        }
        Cmd::AddItem {
            file,
            item,
            catalog,
            enchant,
            equip,
        } => {
            let items = content::catalog(&catalog)?;
            let template = items
                .get(&item.to_lowercase())
                .with_context(|| format!("no item named '{}' in catalog '{}'", item, catalog))?
                .clone()
                .with_enchantment(enchant);
            let name = template.name.clone();
            update(&file, &rules, |c| {
                let id = c.add_item(template)?;
                println!("added {} {}", id, name);
                if equip {
                    let outcome = c.equip(id)?;
                    println!("equipped {}{}", id, describe_slot(outcome.slot));
                }
                Ok(())
            })?;
        }
        Cmd::Equip { file, id } => {
            update(&file, &rules, |c| {
                let outcome = c.equip(ItemId(id))?;
                println!("equipped {}{}", ItemId(id), describe_slot(outcome.slot));
                for evicted in outcome.evicted {
                    println!("unequipped {}", evicted);
                }
                Ok(())
            })?;
        }
        Cmd::Unequip { file, id } => {
            update(&file, &rules, |c| {
                if c.unequip(ItemId(id))? {
                    println!("unequipped {}", ItemId(id));
                } else {
                    println!("{} was not equipped", ItemId(id));
                }
                Ok(())
            })?;
        }
        Cmd::Enchant { file, id, delta } => {
            update(&file, &rules, |c| {
                let level = c.modify_enchantment(ItemId(id), delta)?;
                println!("{} enchantment {}", ItemId(id), signed(level));
                Ok(())
            })?;
        }
        Cmd::Spend { file, pool } => {
            update(&file, &rules, |c| {
                if !c.spend(pool) {
                    bail!("no {} points left", pool);
                }
                let p = c.resources().pool(pool);
                println!("{} {}/{}", pool, p.current, p.max);
                Ok(())
            })?;
        }
        Cmd::Rest { file, kind } => {
            update(&file, &rules, |c| {
                match kind {
                    RestKind::Short => c.short_rest(),
                    RestKind::Long => c.long_rest(),
                }
                for pool in Pool::ALL {
                    let p = c.resources().pool(pool);
                    println!("{} {}/{}", pool, p.current, p.max);
                }
                Ok(())
            })?;
        }
        Cmd::Override {
            file,
            stat,
            delta,
            enable,
            disable,
            clear,
        } => {
            if stat.is_none() && !enable && !disable && !clear {
                bail!("nothing to change: pass --stat/--delta, --enable, --disable or --clear");
            }
            update(&file, &rules, |c| {
                if clear {
                    c.clear_stat_modifiers();
                }
                if let (Some(stat), Some(delta)) = (stat, delta) {
                    let stored = c.set_stat_modifier(stat, delta);
                    println!("{} override {}", stat, signed(stored));
                }
                if enable || disable {
                    c.set_use_stat_overrides(enable);
                }
                let state = if c.stat_overrides().enabled { "on" } else { "off" };
                println!("overrides {}", state);
                Ok(())
            })?;
        }
        Cmd::Roll { file, what, dice: expr } => match (expr, file, what) {
            (Some(expr), _, _) => println!("{}: {}", expr, dice.roll(expr)),
            (None, Some(file), Some(what)) => {
                update(&file, &rules, |c| roll_query(c, &mut dice, what))?;
            }
            _ => bail!("roll needs --dice, or --file and a roll kind"),
        },
    }
    Ok(())
}

fn describe_slot(slot: Option<sheet_engine::Slot>) -> String {
    match slot {
        Some(slot) => format!(" in {}", slot),
        None => String::new(),
    }
}
