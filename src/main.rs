use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser};
use mask_core::{
    FormatDefinition, FormatPreset, KeyEvent, MaskParser, SelectionRange, StringHost,
    TextCursorHost,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "maskedit")]
#[command(about = "Replay key presses against a masked input and print every frame")]
#[command(group(ArgGroup::new("format").required(true).args(["preset", "format_file"])))]
struct Cli {
    /// Built-in format: day-month-year, month-day-year, year-month-day, 12-hour, 24-hour
    #[arg(short, long)]
    preset: Option<FormatPreset>,

    /// Format definition file (.json or .toml)
    #[arg(short, long)]
    format_file: Option<PathBuf>,

    /// Raw value loaded before the first key
    #[arg(long)]
    value: Option<String>,

    /// Turn the format into a range, joined by this separator (e.g. " - ")
    #[arg(long)]
    range: Option<String>,

    /// Ripple characters left across fields on backspace/delete
    #[arg(long)]
    delete_shift: bool,

    /// Keys in DOM naming ("5", "ArrowLeft", "Backspace", "shift+Tab", "ctrl+c")
    keys: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut definition = match (&cli.preset, &cli.format_file) {
        (Some(preset), _) => preset.definition(),
        (None, Some(path)) => load_definition(path)?,
        (None, None) => bail!("either --preset or --format-file is required"),
    };
    if let Some(separator) = cli.range.as_deref() {
        definition = definition.range(separator);
    }
    if cli.delete_shift {
        definition = definition.with_delete_shift(true);
    }
    definition.validate().context("invalid format definition")?;

    let emissions: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
    let sink = Rc::clone(&emissions);
    let mut mask = MaskParser::new(definition)
        .with_on_change(move |value| sink.borrow_mut().push(value.map(str::to_string)));

    let mut host = StringHost::new();
    host.set_focused(true);
    mask.attach_host(host);
    if let Some(raw) = cli.value.as_deref() {
        mask.load_value(raw);
    }
    print_frame(&mask, "start", None);
    flush_emissions(&emissions);

    for token in &cli.keys {
        let event = parse_key(token);
        let outcome = mask.on_key_down(&event);
        print_frame(&mask, token, Some(format!("{outcome:?}")));
        flush_emissions(&emissions);
    }

    mask.on_blur();
    print_frame(&mask, "blur", None);
    flush_emissions(&emissions);

    match mask.value() {
        Some(value) => println!("value: {value}"),
        None => println!("value: (incomplete)"),
    }
    Ok(())
}

fn load_definition(path: &Path) -> Result<FormatDefinition> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let definition = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => FormatDefinition::from_toml(&src),
        _ => FormatDefinition::from_json(&src),
    };
    definition.with_context(|| format!("failed to load {}", path.display()))
}

/// `shift+`, `ctrl+` and `meta+` prefixes set the matching modifier.
fn parse_key(token: &str) -> KeyEvent {
    let mut rest = token;
    let (mut shift, mut ctrl, mut meta) = (false, false, false);
    while let Some((prefix, tail)) = rest.split_once('+') {
        if tail.is_empty() {
            break;
        }
        match prefix.to_ascii_lowercase().as_str() {
            "shift" => shift = true,
            "ctrl" => ctrl = true,
            "meta" | "cmd" => meta = true,
            _ => break,
        }
        rest = tail;
    }
    let key = match rest {
        "Space" | "space" => " ".to_string(),
        other => other.to_string(),
    };
    let mut event = KeyEvent::new(key);
    if shift {
        event = event.with_shift();
    }
    if ctrl {
        event = event.with_ctrl();
    }
    if meta {
        event = event.with_meta();
    }
    event
}

fn print_frame(mask: &MaskParser<StringHost>, label: &str, outcome: Option<String>) {
    let Some(host) = mask.host() else {
        return;
    };
    let text = with_caret(host.text(), host.selection());
    let invalid = if mask.is_invalid() { "  !invalid" } else { "" };
    match outcome {
        Some(outcome) => println!("{label:>12}  {text}  {outcome}{invalid}"),
        None => println!("{label:>12}  {text}{invalid}"),
    }
}

fn with_caret(text: &str, selection: SelectionRange) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for (i, ch) in text.chars().enumerate() {
        if i == selection.start {
            out.push(if selection.is_caret() { '|' } else { '[' });
        }
        if !selection.is_caret() && i == selection.end {
            out.push(']');
        }
        out.push(ch);
    }
    let len = text.chars().count();
    if selection.start >= len {
        out.push(if selection.is_caret() { '|' } else { '[' });
    }
    if !selection.is_caret() && selection.end >= len {
        out.push(']');
    }
    out
}

fn flush_emissions(emissions: &Rc<RefCell<Vec<Option<String>>>>) {
    for value in emissions.borrow_mut().drain(..) {
        match value {
            Some(value) => println!("{:>12}  change -> {value:?}", ""),
            None => println!("{:>12}  change -> (empty)", ""),
        }
    }
}
