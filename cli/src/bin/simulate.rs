use clap::Parser;
use serde::Serialize;
use sheet_cli::{load_sheet, rules_or_default};
use sheet_engine::{Character, Dice};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "Monte Carlo sim: mean attack and damage rolls for a saved sheet")]
struct Args {
    /// Path to a sheet written by `sheet new`
    #[arg(long)]
    file: PathBuf,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Balance file (YAML or JSON); defaults to the built-in rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Running totals for one roll kind.
#[derive(Default)]
struct Tally {
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    count: u32,
}

impl Tally {
    fn push(&mut self, value: Option<f64>) {
        let Some(v) = value else { return };
        self.sum += v;
        self.count += 1;
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    fn summary(&self, label: &'static str, average_dice: Option<f64>) -> Summary {
        Summary {
            label,
            mean: (self.count > 0).then(|| self.sum / self.count as f64),
            min: self.min,
            max: self.max,
            average_dice,
        }
    }
}

#[derive(Serialize)]
struct Summary {
    label: &'static str,
    mean: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    average_dice: Option<f64>,
}

impl Summary {
    fn line(&self) -> String {
        let label = format!("{}:", self.label);
        let Some(mean) = self.mean else {
            return format!("{:<20}(empty hand)", label);
        };
        format!(
            "{:<20}mean {:.2}  min {}  max {}  average-dice {}",
            label,
            mean,
            self.min.unwrap_or_default(),
            self.max.unwrap_or_default(),
            self.average_dice.map_or_else(|| "-".to_string(), |e| e.to_string()),
        )
    }
}

#[derive(Serialize)]
struct Report {
    sheet: String,
    level: u32,
    trials: u32,
    armor_class: i32,
    rolls: Vec<Summary>,
}

fn simulate(character: &Character, trials: u32, seed: u64) -> Report {
    let mut main_attack = Tally::default();
    let mut main_damage = Tally::default();
    let mut off_attack = Tally::default();
    let mut off_damage = Tally::default();

    for i in 0..trials {
        let mut dice = Dice::from_seed(seed.wrapping_add(i as u64));
        main_attack.push(character.main_hand_attack_roll(&mut dice));
        main_damage.push(character.main_hand_damage_roll(&mut dice));
        off_attack.push(character.off_hand_attack_roll(&mut dice));
        off_damage.push(character.off_hand_damage_roll(&mut dice));
    }

    let mut avg = Dice::average();
    Report {
        sheet: character.name().to_string(),
        level: character.level(),
        trials,
        armor_class: character.armor_class(),
        rolls: vec![
            main_attack.summary("main-hand attack", character.main_hand_attack_roll(&mut avg)),
            main_damage.summary("main-hand damage", character.main_hand_damage_roll(&mut avg)),
            off_attack.summary("off-hand attack", character.off_hand_attack_roll(&mut avg)),
            off_damage.summary("off-hand damage", character.off_hand_damage_roll(&mut avg)),
        ],
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.trials == 0 {
        anyhow::bail!("--trials must be at least 1");
    }

    let rules = rules_or_default(args.rules.as_deref())?;
    let character = load_sheet(&args.file, &rules)?;
    let report = simulate(&character, args.trials, args.seed);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("simulate results");
    println!("----------------");
    println!("sheet:              {} (level {})", report.sheet, report.level);
    println!("trials:             {}", report.trials);
    println!("armor class:        {}", report.armor_class);
    println!();
    for summary in &report.rolls {
        println!("{}", summary.line());
    }

    Ok(())
}
