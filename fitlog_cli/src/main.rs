use chrono::{Duration, Local, NaiveDate, NaiveTime, Timelike};
use clap::{Args, Parser, Subcommand};
use fitlog_core::*;
use std::io::Read;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Personal workout and nutrition tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log, list and remove workouts
    Workout {
        #[command(subcommand)]
        action: WorkoutAction,
    },

    /// Log, import, list and remove meals
    Meal {
        #[command(subcommand)]
        action: MealAction,
    },

    /// Set or show the physiological profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Summarize intake and activity over a day, week or month
    Summary {
        #[command(flatten)]
        period: PeriodArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Count consecutive active days ending at a date
    Streak {
        /// Reference day (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show daily calorie and macro targets
    Targets {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List upcoming dates of recurring workouts
    Schedule {
        /// First day to list (default: today)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Number of days to cover
        #[arg(long, default_value_t = 14)]
        days: u32,
    },

    /// Export per-day summaries to CSV
    Export {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output CSV path
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct PeriodArgs {
    /// Period to cover (day, week, month); defaults to the configured period
    #[arg(long)]
    period: Option<PeriodKind>,

    /// Any date inside the period (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum WorkoutAction {
    /// Log a workout
    Add {
        /// Exercise type (gym, running, cycling, yoga, swimming, hiking, other)
        #[arg(long = "type")]
        exercise_type: ExerciseType,

        /// Duration in minutes
        #[arg(long)]
        duration: u32,

        /// Intensity (low, medium, high)
        #[arg(long, default_value = "medium")]
        intensity: Intensity,

        /// Calories burned; estimated from the profile weight when omitted
        #[arg(long)]
        calories: Option<u32>,

        /// Date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Time of day, HH:MM (default: now)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,

        /// Repeat the workout (daily, weekly, custom)
        #[arg(long)]
        repeat: Option<RecurrenceType>,

        /// Weekdays for weekly repeats, 0 = Sunday .. 6 = Saturday
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,

        /// Day interval for custom repeats
        #[arg(long)]
        every: Option<i64>,

        /// Last date the repeat applies to (inclusive)
        #[arg(long)]
        until: Option<NaiveDate>,
    },

    /// List stored workouts
    List {
        #[arg(long)]
        json: bool,
    },

    /// Delete a workout by id
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum MealAction {
    /// Log a meal from foods given as NAME:KCAL:PROTEIN:CARBS:FAT
    Add {
        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "type")]
        meal_type: MealType,

        /// Food item, repeatable
        #[arg(long = "food", value_parser = parse_food, required = true)]
        foods: Vec<FoodItem>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
    },

    /// Log a meal from a food-analysis reply (file or stdin)
    Import {
        /// Meal type used when the reply does not name one
        #[arg(long = "type", default_value = "snack")]
        meal_type: MealType,

        /// Reply file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
    },

    /// List stored meals
    List {
        #[arg(long)]
        json: bool,
    },

    /// Delete a meal by id
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save the profile
    Set {
        #[arg(long)]
        age: u32,

        /// Body weight in kg
        #[arg(long)]
        weight: f64,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// male or female
        #[arg(long)]
        sex: Sex,

        /// sedentary, light, moderate, active, very_active
        #[arg(long, default_value = "moderate")]
        activity: ActivityLevel,

        /// lose_fat, gain_muscle, maintain
        #[arg(long, default_value = "maintain")]
        goal: Goal,
    },

    /// Show the saved profile
    Show {
        #[arg(long)]
        json: bool,
    },
}

fn parse_time(raw: &str) -> std::result::Result<NaiveTime, String> {
    fitlog_core::types::hhmm::parse(raw).map_err(|e| format!("expected HH:MM ({})", e))
}

fn parse_food(raw: &str) -> std::result::Result<FoodItem, String> {
    // Numbers come last so the name may itself contain ':'
    let mut parts = raw.rsplitn(5, ':');
    let mut number = |what: &str| -> std::result::Result<u32, String> {
        parts
            .next()
            .ok_or_else(|| format!("missing {} in '{}'", what, raw))?
            .trim()
            .parse()
            .map_err(|_| format!("invalid {} in '{}'", what, raw))
    };
    let fat_grams = number("fat")?;
    let carbs_grams = number("carbs")?;
    let protein_grams = number("protein")?;
    let calories = number("calories")?;
    let name = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| format!("missing name in '{}'", raw))?;

    Ok(FoodItem {
        name: name.to_string(),
        calories,
        protein_grams,
        carbs_grams,
        fat_grams,
    })
}

fn main() -> Result<()> {
    // Initialize logging
    fitlog_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let mut store = FileStore::new(data_dir);

    match cli.command {
        Commands::Workout { action } => cmd_workout(&mut store, action),
        Commands::Meal { action } => cmd_meal(&mut store, action),
        Commands::Profile { action } => cmd_profile(&mut store, action),
        Commands::Summary { period, json } => cmd_summary(&store, &config, period, json),
        Commands::Streak { date } => cmd_streak(&store, date),
        Commands::Targets { json } => cmd_targets(&store, &config, json),
        Commands::Schedule { from, days } => cmd_schedule(&store, from, days),
        Commands::Export { period, output } => cmd_export(&store, &config, period, output),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn now_hh_mm() -> NaiveTime {
    let now = Local::now().time();
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN)
}

fn load_records(store: &FileStore) -> (Vec<WorkoutRecord>, Vec<MealRecord>) {
    (
        load_or_empty("workouts", store.workouts()),
        load_or_empty("meals", store.meals()),
    )
}

fn load_profile(store: &FileStore) -> Option<Profile> {
    match store.profile() {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Failed to load profile: {}", e);
            None
        }
    }
}

fn resolve_period(config: &Config, args: &PeriodArgs) -> Period {
    let kind = args.period.unwrap_or(config.report.default_period);
    Period::around(kind, args.date.unwrap_or_else(today))
}

fn cmd_workout(store: &mut FileStore, action: WorkoutAction) -> Result<()> {
    match action {
        WorkoutAction::Add {
            exercise_type,
            duration,
            intensity,
            calories,
            date,
            time,
            repeat,
            days,
            every,
            until,
        } => {
            let calories_burned = match calories {
                Some(c) => c,
                None => {
                    let profile = load_profile(store).ok_or_else(|| {
                        Error::Other(
                            "No profile set: pass --calories or run `fitlog profile set`".into(),
                        )
                    })?;
                    estimate_calories_burned(exercise_type, intensity, duration, profile.weight_kg)
                }
            };

            let mut workout = WorkoutRecord::new(
                date.unwrap_or_else(today),
                time.unwrap_or_else(now_hh_mm),
                exercise_type,
                duration,
                intensity,
                calories_burned,
            );

            workout = match repeat {
                None | Some(RecurrenceType::None) => workout,
                Some(RecurrenceType::Daily) => workout.daily(),
                Some(RecurrenceType::Weekly) => workout.weekly(days),
                Some(RecurrenceType::Custom) => workout.every_n_days(every.unwrap_or(0)),
                Some(RecurrenceType::Unknown) => {
                    return Err(Error::InvalidRecord("unknown recurrence type".into()))
                }
            };
            if let Some(end) = until {
                workout = workout.until(end);
            }

            store.add_workout(&workout)?;
            println!(
                "✓ Logged {} {} min ({} kcal) on {}",
                workout.exercise_type, workout.duration, workout.calories_burned, workout.date
            );
            println!("  id: {}", workout.id);
            Ok(())
        }

        WorkoutAction::List { json } => {
            let mut workouts = store.workouts()?;
            workouts.sort_by_key(|w| (w.date, w.time));
            if json {
                println!("{}", serde_json::to_string_pretty(&workouts)?);
                return Ok(());
            }
            if workouts.is_empty() {
                println!("No workouts logged.");
            }
            for w in &workouts {
                let repeat = if w.is_recurring() {
                    format!(" [repeats {:?}]", w.recurrence_type).to_lowercase()
                } else {
                    String::new()
                };
                println!(
                    "{} {}  {:<9} {:>4} min  {:>5} kcal  {}{}",
                    w.date,
                    w.time.format("%H:%M"),
                    w.exercise_type,
                    w.duration,
                    w.calories_burned,
                    w.id,
                    repeat
                );
            }
            Ok(())
        }

        WorkoutAction::Delete { id } => {
            store.delete_workout(id)?;
            println!("✓ Deleted workout {}", id);
            Ok(())
        }
    }
}

fn cmd_meal(store: &mut FileStore, action: MealAction) -> Result<()> {
    let meal = match action {
        MealAction::Add {
            meal_type,
            foods,
            date,
            time,
        } => MealRecord::new(
            date.unwrap_or_else(today),
            time.unwrap_or_else(now_hh_mm),
            meal_type,
            foods,
        ),

        MealAction::Import {
            meal_type,
            file,
            date,
            time,
        } => {
            let reply = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            FoodAnalysis::from_response(&reply)?.into_meal(
                date.unwrap_or_else(today),
                time.unwrap_or_else(now_hh_mm),
                meal_type,
            )
        }

        MealAction::List { json } => {
            let mut meals = store.meals()?;
            meals.sort_by_key(|m| (m.date, m.time));
            if json {
                println!("{}", serde_json::to_string_pretty(&meals)?);
                return Ok(());
            }
            if meals.is_empty() {
                println!("No meals logged.");
            }
            for m in &meals {
                println!(
                    "{} {}  {:<9} {:>5} kcal  P{} C{} F{}  {}",
                    m.date,
                    m.time.format("%H:%M"),
                    m.meal_type,
                    m.total_calories,
                    m.total_protein,
                    m.total_carbs,
                    m.total_fat,
                    m.id
                );
                for food in &m.foods {
                    println!("    - {} ({} kcal)", food.name, food.calories);
                }
            }
            return Ok(());
        }

        MealAction::Delete { id } => {
            store.delete_meal(id)?;
            println!("✓ Deleted meal {}", id);
            return Ok(());
        }
    };

    store.add_meal(&meal)?;
    println!(
        "✓ Logged {} with {} foods ({} kcal) on {}",
        meal.meal_type,
        meal.foods.len(),
        meal.total_calories,
        meal.date
    );
    println!("  id: {}", meal.id);
    Ok(())
}

fn cmd_profile(store: &mut FileStore, action: ProfileAction) -> Result<()> {
    match action {
        ProfileAction::Set {
            age,
            weight,
            height,
            sex,
            activity,
            goal,
        } => {
            let profile = Profile {
                age,
                weight_kg: weight,
                height_cm: height,
                sex,
                activity_level: activity,
                goal,
            };
            store.save_profile(&profile)?;
            println!("✓ Profile saved");
            Ok(())
        }

        ProfileAction::Show { json } => {
            let profile = store
                .profile()?
                .ok_or_else(|| Error::NotFound("profile".into()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("Age:      {}", profile.age);
                println!("Weight:   {} kg", profile.weight_kg);
                println!("Height:   {} cm", profile.height_cm);
                println!("Sex:      {:?}", profile.sex);
                println!("Activity: {:?}", profile.activity_level);
                println!("Goal:     {:?}", profile.goal);
            }
            Ok(())
        }
    }
}

fn resolve_targets(store: &FileStore, config: &Config) -> Option<DailyTargets> {
    load_profile(store).map(|p| config.targets.apply(daily_targets(&p)))
}

fn cmd_summary(store: &FileStore, config: &Config, args: PeriodArgs, json: bool) -> Result<()> {
    let period = resolve_period(config, &args);
    let (workouts, meals) = load_records(store);
    let summary = summarize_period(&period.dates(), &workouts, &meals);

    let progress = resolve_targets(store, config)
        .map(|t| TargetProgress::compare(&t, &summary.totals, summary.days.len() as u64));

    if json {
        let value = serde_json::json!({
            "period": period,
            "summary": summary,
            "targets": progress,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{:<10}  {:>8} {:>8} {:>8}  {:>5} {:>5} {:>5}  {:>5}",
        "date", "in", "out", "balance", "P", "C", "F", "min"
    );
    for day in &summary.days {
        let t = &day.totals;
        println!(
            "{:<10}  {:>8} {:>8} {:>8}  {:>5} {:>5} {:>5}  {:>5}",
            day.date.to_string(),
            t.calories_consumed,
            t.calories_burned,
            day.balance(),
            t.protein,
            t.carbs,
            t.fat,
            t.workout_minutes
        );
    }

    let t = &summary.totals;
    println!();
    println!("Consumed: {} kcal", t.calories_consumed);
    println!("Burned:   {} kcal", t.calories_burned);
    println!("Balance:  {} kcal", summary.balance());
    println!("Average:  {} kcal/day", summary.average_calories_consumed);
    println!("Workouts: {} ({} min)", t.workout_count, t.workout_minutes);

    if !summary.by_exercise.is_empty() {
        println!();
        for (exercise, totals) in &summary.by_exercise {
            println!(
                "  {:<9} {:>5} min {:>6} kcal",
                exercise.to_string(),
                totals.minutes,
                totals.calories_burned
            );
        }
    }

    if let Some(p) = progress {
        println!();
        println!(
            "Target:   {} kcal ({}%), P {}/{}g, C {}/{}g, F {}/{}g",
            p.calories.target,
            p.calories.percent,
            p.protein.actual,
            p.protein.target,
            p.carbs.actual,
            p.carbs.target,
            p.fat.actual,
            p.fat.target
        );
    }

    Ok(())
}

fn cmd_streak(store: &FileStore, date: Option<NaiveDate>) -> Result<()> {
    let (workouts, meals) = load_records(store);
    let streak = current_streak(&workouts, &meals, date.unwrap_or_else(today));
    println!("Current streak: {} day{}", streak, if streak == 1 { "" } else { "s" });
    Ok(())
}

fn cmd_targets(store: &FileStore, config: &Config, json: bool) -> Result<()> {
    let targets = resolve_targets(store, config).ok_or_else(|| {
        Error::NotFound("profile (run `fitlog profile set` first)".into())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
    } else {
        println!("Calories: {} kcal", targets.calories);
        println!("Protein:  {} g", targets.protein_g);
        println!("Carbs:    {} g", targets.carbs_g);
        println!("Fat:      {} g", targets.fat_g);
    }
    Ok(())
}

fn cmd_schedule(store: &FileStore, from: Option<NaiveDate>, days: u32) -> Result<()> {
    let start = from.unwrap_or_else(today);
    let end = start
        .checked_add_signed(Duration::days(i64::from(days.max(1)) - 1))
        .ok_or_else(|| Error::Other(format!("{} days from {} is past the calendar", days, start)))?;
    let workouts = load_or_empty("workouts", store.workouts());

    let mut any = false;
    for workout in workouts.iter().filter(|w| w.is_recurring()) {
        let dates = occurrences(workout, start, end);
        if dates.is_empty() {
            continue;
        }
        any = true;
        let listed: Vec<String> = dates.iter().map(|d| d.format("%a %m-%d").to_string()).collect();
        println!(
            "{} {} min ({}): {}",
            workout.exercise_type,
            workout.duration,
            workout.id,
            listed.join(", ")
        );
    }

    if !any {
        println!("No recurring workouts between {} and {}.", start, end);
    }
    Ok(())
}

fn cmd_export(store: &FileStore, config: &Config, args: PeriodArgs, output: PathBuf) -> Result<()> {
    let period = resolve_period(config, &args);
    let (workouts, meals) = load_records(store);
    let summary = summarize_period(&period.dates(), &workouts, &meals);

    let rows = write_period_csv(&summary, &output)?;
    println!("✓ Exported {} days to {}", rows, output.display());
    Ok(())
}
