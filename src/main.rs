use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use kuis_kosakata::config::Config;
use kuis_kosakata::logging;
use kuis_kosakata::storage::{KeyValueStore, MemoryStore, NameChange, SqliteStore};
use kuis_kosakata::{AnswerOutcome, QuizApp, QuizError, Screen, VocabularyStore};

type Input = Lines<BufReader<Stdin>>;
type App = QuizApp<Box<dyn KeyValueStore>>;

const HELP: &str = "\
commands:
  status                 show rank, level and stage
  a <n> | <option text>  answer the current question
  skip                   don't know (sequential mode only)
  review / exit-review   start or leave mistake review
  replay <from> <to>     drill a range of stages
  exit-replay            leave replay
  history                list corrected words
  delete <id>            delete one history entry
  clear-history          delete all history entries
  name <new name>        change user name (resets progress)
  search <query>         search the vocabulary
  quit";

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let vocabulary = match VocabularyStore::load(&config.vocab_path).await {
        Ok(vocabulary) => vocabulary,
        Err(err) => {
            tracing::warn!(error = %err, "vocabulary unavailable, quiz area stays empty");
            VocabularyStore::default()
        }
    };

    let store: Box<dyn KeyValueStore> = if config.uses_memory_store() {
        Box::new(MemoryStore::new())
    } else {
        match SqliteStore::new(&config.db_path) {
            Ok(store) => Box::new(store),
            Err(err) => {
                tracing::error!(
                    error = %err,
                    path = %config.db_path.display(),
                    "failed to open progress store, progress will not survive restart"
                );
                Box::new(MemoryStore::new())
            }
        }
    };

    let mut app: App = QuizApp::new(vocabulary, store, config.pacing);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    print_status(&app);
    print_screen(&app.current_display());

    loop {
        let line = match input.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::error!(error = %err, "failed to read input");
                break;
            }
        };

        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if let Err(err) = handle_command(&mut app, line, &mut input).await {
            println!("! {err}");
        }
    }
}

async fn handle_command(app: &mut App, line: &str, input: &mut Input) -> Result<(), QuizError> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "help" => println!("{HELP}"),
        "status" => print_status(app),
        "skip" => {
            app.skip_current()?;
            print_status(app);
            print_screen(&app.current_display());
        }
        "review" => print_screen(&app.start_review()),
        "exit-review" => print_screen(&app.exit_review()),
        "replay" => {
            let mut bounds = rest.split_whitespace();
            let from = bounds.next().unwrap_or("");
            let to = bounds.next().unwrap_or("");
            print_screen(&app.start_replay_text(from, to)?);
        }
        "exit-replay" => print_screen(&app.exit_replay()),
        "history" => {
            if app.history().is_empty() {
                println!("(no corrections yet)");
            }
            for entry in app.history() {
                println!("[{}] {} -> {}", entry.id, entry.prompt, entry.correct_answer);
            }
        }
        "delete" => {
            let deleted = match rest.parse::<i64>() {
                Ok(id) => app.delete_history_entry(id)?,
                Err(_) => false,
            };
            if deleted {
                println!("deleted {rest}");
            } else {
                println!("no history entry {rest:?}");
            }
        }
        "clear-history" => {
            let confirmed = confirm(input, "delete all history?").await;
            let removed = app.clear_all_history(|| confirmed)?;
            println!("removed {removed} entries");
        }
        "name" => {
            let current = app.summary().user_name;
            let confirmed = if current.as_deref() == Some(rest) {
                false
            } else {
                confirm(input, "changing the user name resets ALL progress. continue?").await
            };
            match app.change_username(rest, || confirmed)? {
                NameChange::Reset => {
                    println!("progress reset");
                    print_status(app);
                    print_screen(&app.current_display());
                }
                NameChange::Declined => println!("name unchanged"),
                NameChange::Unchanged => {}
            }
        }
        "search" => {
            for record in app.search_vocabulary(rest) {
                println!("{}: {}", record.prompt, record.correct_answer);
            }
        }
        "a" => {
            let choice = resolve_choice(app, rest);
            answer(app, &choice).await?;
        }
        _ => answer(app, line).await?,
    }

    Ok(())
}

/// `a 2` 选第二个选项，其余按选项原文处理
fn resolve_choice(app: &App, raw: &str) -> String {
    let screen = app.current_display();
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| screen.question().and_then(|q| q.options.get(i).cloned()))
        .unwrap_or_else(|| raw.to_string())
}

async fn answer(app: &mut App, choice: &str) -> Result<(), QuizError> {
    let outcome = app.submit_answer(choice)?;
    println!("{}", if outcome.correct { "✔ correct" } else { "✘ wrong" });
    run_transitions(app, outcome).await;
    Ok(())
}

async fn run_transitions(app: &mut App, outcome: AnswerOutcome) {
    let Some(delay) = outcome.advance_after else {
        print_status(app);
        return;
    };

    tokio::time::sleep(delay).await;
    let mut screen = app.advance_display();
    print_screen(&screen);

    match screen {
        Screen::ReviewCleared { exit_after } => {
            tokio::time::sleep(exit_after).await;
            screen = app.advance_display();
            print_screen(&screen);
        }
        Screen::ReplayComplete => {
            screen = app.exit_replay();
            print_screen(&screen);
        }
        _ => {}
    }
    print_status(app);
}

async fn confirm(input: &mut Input, prompt: &str) -> bool {
    println!("{prompt} [y/N]");
    matches!(
        input.next_line().await,
        Ok(Some(line)) if matches!(line.trim(), "y" | "Y" | "yes")
    )
}

fn print_status(app: &App) {
    let s = app.summary();
    println!(
        "{} | {} ({}) | Lv {} | {}/100 XP | total {} XP | Stage {} | mistakes {}",
        s.user_name.as_deref().unwrap_or("-"),
        s.rank_name,
        s.rank_code,
        s.level,
        s.xp_within_level,
        s.total_xp,
        s.stage,
        s.mistake_count,
    );
}

fn print_screen(screen: &Screen) {
    match screen {
        Screen::Question(view) => {
            if let Some(label) = &view.label {
                println!("{label}");
            }
            println!("» {}", view.prompt);
            for (i, option) in view.options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
        }
        Screen::Idle => println!("(no more questions)"),
        Screen::ReviewCleared { .. } => println!("all mistakes corrected 🎉"),
        Screen::ReplayComplete => println!("marathon complete 🎉"),
    }
}
