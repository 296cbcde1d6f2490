use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use engine::api::{
    find_attack, format_modifier, simulate_volley, simulate_volley_many, VolleyConfig,
};
use engine::config::Settings;
use engine::content::builtin_bestiary;
use engine::filter::{sort_by_cr_then_name, CreatureFilter};
use engine::roller::DicePool;
use engine::store::{import_markdown, MemoryStore};
use engine::{challenge_value, extract_attack_profiles, roll_attack, AdMode, Dice};

#[derive(Copy, Clone, ValueEnum)]
enum Adv {
    Normal,
    Advantage,
    Disadvantage,
}

#[derive(Subcommand)]
enum Cmd {
    /// Parse a markdown bestiary and print the creatures as JSON
    Parse {
        /// Markdown file to parse
        file: PathBuf,
        /// Pretty-print JSON
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// List creatures in a bestiary, optionally filtered
    List {
        /// Markdown bestiary (built-in beasts when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Case-insensitive name fragment
        #[arg(long)]
        name: Option<String>,
        /// Size category, e.g. Medium
        #[arg(long)]
        size: Option<String>,
        /// Creature type, e.g. beast
        #[arg(long = "type")]
        creature_type: Option<String>,
        /// Environment fragment
        #[arg(long)]
        env: Option<String>,
        /// Lowest challenge rating, e.g. 1/4
        #[arg(long)]
        min_cr: Option<String>,
        /// Highest challenge rating, e.g. 2
        #[arg(long)]
        max_cr: Option<String>,
    },
    /// Conjure a creature and have every copy attack a target once
    Volley {
        /// Markdown bestiary (built-in beasts when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Creature id or name
        #[arg(long)]
        creature: String,
        /// Attack name (first attack when omitted)
        #[arg(long)]
        attack: Option<String>,
        /// Number of copies (derived from challenge rating when omitted)
        #[arg(long)]
        count: Option<u32>,
        /// Advantage mode
        #[arg(long, value_enum)]
        adv: Option<Adv>,
        /// Target armor class
        #[arg(long)]
        ac: Option<i32>,
        /// RNG seed for determinism
        #[arg(long)]
        seed: Option<u64>,
        /// Repeat the volley this many times and print a summary instead
        #[arg(long)]
        samples: Option<u32>,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Roll one attack, with damage, for a creature
    Attack {
        /// Markdown bestiary (built-in beasts when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Creature id or name
        #[arg(long)]
        creature: String,
        /// Attack name (first attack when omitted)
        #[arg(long)]
        attack: Option<String>,
        /// Advantage mode
        #[arg(long, value_enum)]
        adv: Option<Adv>,
        /// RNG seed for determinism
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Roll polyhedral dice, e.g. "2d6 + 1d4 + 3"
    Roll {
        /// Dice notation
        notation: String,
        /// RNG seed for determinism
        #[arg(long)]
        seed: Option<u64>,
        /// Number of times to roll
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
}

#[derive(Parser)]
#[command(name = "bestiary-cli")]
#[command(about = "Beast statblock parser and attack roller")]
struct Cli {
    /// Settings file (YAML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

fn to_mode(a: Adv) -> AdMode {
    match a {
        Adv::Normal => AdMode::Normal,
        Adv::Advantage => AdMode::Advantage,
        Adv::Disadvantage => AdMode::Disadvantage,
    }
}

fn read_text_auto(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn load_store(settings: &Settings, file: Option<&Path>) -> anyhow::Result<MemoryStore> {
    let text = match file {
        Some(path) => read_text_auto(path)?,
        None => builtin_bestiary("beasts")
            .ok_or_else(|| anyhow::anyhow!("built-in bestiary missing"))?
            .to_string(),
    };
    let mut store = MemoryStore::new();
    if import_markdown(&mut store, &settings.parser(), &text) == 0 {
        anyhow::bail!("no creatures found");
    }
    Ok(store)
}

fn parse_cr_bound(raw: Option<&str>) -> anyhow::Result<Option<f64>> {
    raw.map(|cr| {
        challenge_value(cr).ok_or_else(|| anyhow::anyhow!("invalid challenge rating '{}'", cr))
    })
    .transpose()
}

fn dice_for(settings: &Settings, seed: Option<u64>) -> Dice {
    match seed.or(settings.seed) {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::from_entropy(),
    }
}

fn main() -> anyhow::Result<()> {
    engine::init_tracing("warn");
    let cli = Cli::parse();
    let settings = match cli.config.as_ref() {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings: {}", path.display()))?,
        None => Settings::default(),
    };

    match cli.cmd {
        Cmd::Parse { file, pretty } => {
            let text = read_text_auto(&file)?;
            let creatures = settings.parser().parse(&text);
            if creatures.is_empty() {
                eprintln!("no creatures found in {}", file.display());
            }
            if pretty {
                println!("{}", serde_json::to_string_pretty(&creatures)?);
            } else {
                println!("{}", serde_json::to_string(&creatures)?);
            }
        }
        Cmd::List {
            file,
            name,
            size,
            creature_type,
            env,
            min_cr,
            max_cr,
        } => {
            let store = load_store(&settings, file.as_deref())?;
            let filter = CreatureFilter {
                name_contains: name,
                size,
                creature_type,
                environment: env,
                min_cr: parse_cr_bound(min_cr.as_deref())?,
                max_cr: parse_cr_bound(max_cr.as_deref())?,
            };
            let mut found = filter.apply(store.iter());
            sort_by_cr_then_name(&mut found);
            for c in found {
                println!(
                    "{:<24} CR {:<4} {:<8} {:<12} HP {}",
                    c.name,
                    c.cr.as_deref().unwrap_or("?"),
                    c.size.as_deref().unwrap_or("?"),
                    c.creature_type.as_deref().unwrap_or("?"),
                    c.hit_points.as_deref().unwrap_or("?")
                );
            }
        }
        Cmd::Volley {
            file,
            creature,
            attack,
            count,
            adv,
            ac,
            seed,
            samples,
            json,
        } => {
            let cfg = VolleyConfig {
                bestiary_path: file.map(|p| p.to_string_lossy().into_owned()),
                bestiary_id: None,
                creature,
                attack,
                count,
                mode: adv.map(to_mode).unwrap_or(settings.roll_mode),
                target_ac: ac.unwrap_or(settings.target_ac),
                seed: seed.or(settings.seed),
                environment: Some(settings.default_environment.clone()),
            };
            if let Some(samples) = samples {
                let stats = simulate_volley_many(cfg, samples)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    println!("volley results");
                    println!("--------------");
                    println!("samples:            {}", stats.samples);
                    println!("summoned:           {}", stats.summoned);
                    println!("mean hits:          {:.2}", stats.mean_hits);
                    println!("mean damage:        {:.2}", stats.mean_damage);
                    println!("damage range:       {}..={}", stats.min_damage, stats.max_damage);
                    println!("volleys with crit:  {}", stats.volleys_with_crit);
                }
            } else {
                let res = simulate_volley(cfg)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&res)?);
                } else {
                    for line in &res.log {
                        println!("{}", line);
                    }
                }
            }
        }
        Cmd::Attack {
            file,
            creature,
            attack,
            adv,
            seed,
        } => {
            let store = load_store(&settings, file.as_deref())?;
            let found = store
                .find(&creature)
                .ok_or_else(|| anyhow::anyhow!("creature '{}' not found", creature))?;
            let profiles = extract_attack_profiles(found);
            let profile = find_attack(&profiles, attack.as_deref())
                .ok_or_else(|| anyhow::anyhow!("{} has no matching attack", found.name))?;
            let mode = adv.map(to_mode).unwrap_or(settings.roll_mode);
            let mut dice = dice_for(&settings, seed);
            let res = roll_attack(&mut dice, profile, mode);
            let d20 = match res.die_b {
                Some(b) => format!("d20={} vs d20={} (keep={})", res.die_a, b, res.final_die),
                None => format!("d20={}", res.die_a),
            };
            let tag = if res.is_critical {
                " CRIT!"
            } else if res.is_fumble {
                " NAT1"
            } else {
                ""
            };
            println!(
                "[ATTACK][{}] {} {} {} = {}{}",
                found.name,
                profile.name,
                d20,
                format_modifier(res.attack_bonus),
                res.total,
                tag
            );
            println!(
                "[DMG][{}] rolls={:?} {} = {} {}",
                found.name,
                res.damage.rolls,
                format_modifier(res.damage.modifier),
                res.damage.total,
                res.damage.damage_type
            );
        }
        Cmd::Roll {
            notation,
            seed,
            times,
        } => {
            let pool: DicePool = notation.parse()?;
            let mut dice = dice_for(&settings, seed);
            for _ in 0..times {
                let roll = pool.roll(&mut dice);
                let groups = roll
                    .groups
                    .iter()
                    .map(|g| {
                        let sign = if g.negative { "-" } else { "" };
                        format!("{}d{}{:?}", sign, g.faces, g.rolls)
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                println!(
                    "{} [{}..={}] → {} total={}",
                    pool,
                    pool.min(),
                    pool.max(),
                    groups,
                    roll.total
                );
            }
        }
    }
    Ok(())
}
