//! Presentation formatter: one text block per tracking identifier.
//!
//! Blocks render in input order, independent of the API response
//! order, and absent optional fields are omitted rather than shown
//! blank. `--raw` never reaches this module: raw mode writes the
//! untouched upstream bytes straight to stdout.
//!
//! Two render modes, inherited from the two historical CLI variants:
//! `Basic` keeps the compact ISO-like dates, `Full` adds the context
//! block and uses the localized French date form.

use console::Style;

use crate::codes;
use crate::model::{self, Event, Shipment, TrackingFailure, TrackingResult};

/// Fixed separator between per-identifier blocks.
pub const BLOCK_SEPARATOR: &str = "\n_______________________\n\n";

/// Help URL shown on failure blocks, suffixed with the identifier.
pub const HELP_URL_BASE: &str = "https://www.laposte.fr/outils/suivre-vos-envois?code=";

const DEFAULT_FAILURE_MESSAGE: &str = "Numéro inconnu.";

const LABEL_WIDTH: usize = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Basic,
    Full,
}

/// Terminal styles, built once from config. `--no-color` yields
/// attribute-free styles; `console` additionally strips ANSI on its
/// own when stdout is not a terminal.
pub struct Palette {
    pub label: Style,
    pub context: Style,
    pub date: Style,
    pub ok: Style,
    pub err: Style,
    pub note: Style,
}

impl Palette {
    #[must_use]
    pub fn new(colors: bool) -> Self {
        if colors {
            Self {
                label: Style::new().cyan().bright(),
                context: Style::new().dim(),
                date: Style::new().yellow(),
                ok: Style::new().green(),
                err: Style::new().red(),
                note: Style::new().cyan().bright(),
            }
        } else {
            Self::plain()
        }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self {
            label: Style::new(),
            context: Style::new(),
            date: Style::new(),
            ok: Style::new(),
            err: Style::new(),
            note: Style::new(),
        }
    }
}

/// Render the whole report: results are re-aligned to the input
/// identifier order (exactly one block per identifier) and joined with
/// [`BLOCK_SEPARATOR`].
#[must_use]
pub fn render_batch(
    results: Vec<TrackingResult>,
    input_order: &[String],
    mode: Mode,
    palette: &Palette,
) -> String {
    let aligned = model::align_results(results, input_order);
    let blocks: Vec<String> = aligned
        .iter()
        .map(|result| match result {
            TrackingResult::Success(shipment) => render_shipment(shipment, mode, palette),
            TrackingResult::Failure(failure) => render_failure(failure, palette),
        })
        .collect();
    blocks.join(BLOCK_SEPARATOR)
}

fn render_failure(failure: &TrackingFailure, palette: &Palette) -> String {
    let message = failure
        .return_message
        .as_deref()
        .unwrap_or(DEFAULT_FAILURE_MESSAGE);
    format!(
        "{}{} 👎\n{}\n👉 {}",
        styled_label(&palette.label, "Numéro de suivi"),
        palette.err.apply_to(&failure.id_ship),
        palette.context.apply_to(message),
        palette
            .note
            .apply_to(format!("{HELP_URL_BASE}{}", failure.id_ship)),
    )
}

fn render_shipment(shipment: &Shipment, mode: Mode, palette: &Palette) -> String {
    let mut out = String::new();

    if !shipment.id_ship.is_empty() {
        push_line(
            &mut out,
            &palette.label,
            "Numéro de suivi",
            &format!("{} 👍", palette.ok.apply_to(&shipment.id_ship)),
        );
    }
    if shipment.is_final {
        push_line(&mut out, &palette.label, "Finalisé", "✔️");
    }
    if let Some(ref date) = shipment.entry_date {
        push_line(
            &mut out,
            &palette.label,
            "Date de prise en charge",
            &format_date(date, mode),
        );
    }
    if let Some(ref date) = shipment.delivery_date {
        push_line(
            &mut out,
            &palette.label,
            "Date de livraison",
            &format_date(date, mode),
        );
    }
    if let Some(ref product) = shipment.product {
        push_line(
            &mut out,
            &palette.label,
            "Dénomination du produit",
            &capitalize(product),
        );
    }
    if let Some(holder) = shipment.holder {
        if let Some(label) = codes::holder_label(holder) {
            push_line(&mut out, &palette.label, "Métier en charge de l'objet", label);
        }
    }

    if mode == Mode::Full {
        render_context(shipment, palette, &mut out);
    }

    let events = render_events(&shipment.event, mode, palette);
    if !events.is_empty() {
        out.push('\n');
        out.push_str(&events);
    }

    out
}

fn render_context(shipment: &Shipment, palette: &Palette, out: &mut String) {
    let Some(ref context) = shipment.context_data else {
        return;
    };

    if let Some(ref point) = context.removal_point {
        if let Some(ref name) = point.name {
            let kind = point.r#type.as_deref().unwrap_or("");
            let value = if kind.is_empty() {
                name.clone()
            } else {
                format!("{kind} {name}")
            };
            push_line(out, &palette.context, "Point de retrait", &value);
        }
    }
    if let Some(ref country) = context.origin_country {
        push_line(out, &palette.context, "Pays d'origine", country);
    }
    if let Some(ref country) = context.arrival_country {
        push_line(out, &palette.context, "Pays de destination", country);
    }
    if let Some(ref choice) = context.delivery_choice {
        if let Some(label) = codes::delivery_choice_label(choice.delivery_choice) {
            push_line(out, &palette.context, "Modification de livraison", label);
        }
    }
    if let Some(ref partner) = context.partner {
        let parts: Vec<&str> = [
            partner.name.as_deref(),
            partner.network.as_deref(),
            partner.reference.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !parts.is_empty() {
            push_line(
                out,
                &palette.context,
                "Informations sur poste internationale",
                &parts.join(" - "),
            );
        }
    }
    if let Some(ref url) = shipment.url {
        push_line(out, &palette.context, "URL de suivi", url);
    }
}

/// Events render newest-first in both modes. The upstream already
/// sends them in that order, but the invariant is enforced by sorting
/// on the parsed timestamp (stable, undated events keep their relative
/// position at the tail).
fn render_events(events: &[Event], mode: Mode, palette: &Palette) -> String {
    let mut keyed: Vec<(Option<chrono::DateTime<chrono::FixedOffset>>, &Event)> = events
        .iter()
        .map(|event| (event.date.as_deref().and_then(parse_date), event))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let lines: Vec<String> = keyed
        .iter()
        .map(|(_, event)| {
            let mut line = String::new();
            if let Some(ref date) = event.date {
                line.push_str(&format!(
                    "{} - ",
                    palette.date.apply_to(format_date(date, mode))
                ));
            }
            line.push_str(&event_label(event));
            line
        })
        .collect();
    lines.join("\n")
}

/// API label when present, else the static table message, else the
/// literal code.
fn event_label(event: &Event) -> String {
    if let Some(ref label) = event.label {
        return label.clone();
    }
    let code = event.code.as_deref().unwrap_or("");
    codes::event_message(code).map_or_else(|| code.to_string(), |(message, _)| message.to_string())
}

fn push_line(out: &mut String, style: &Style, label: &str, value: &str) {
    out.push_str(&styled_label(style, label));
    out.push_str(value);
    out.push('\n');
}

fn styled_label(style: &Style, label: &str) -> String {
    // Pad on character count so accented labels line up.
    let pad = LABEL_WIDTH.saturating_sub(label.chars().count());
    format!("{}", style.apply_to(format!("{label}{} : ", " ".repeat(pad))))
}

fn parse_date(raw: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    chrono::DateTime::parse_from_rfc3339(raw).ok()
}

/// Render a timestamp in the UTC offset the upstream provided.
/// Unparseable strings render verbatim.
fn format_date(raw: &str, mode: Mode) -> String {
    parse_date(raw).map_or_else(
        || raw.to_string(),
        |date| match mode {
            Mode::Basic => date.format("%Y-%m-%d %H:%M:%S").to_string(),
            Mode::Full => date.format("Le %d/%m/%Y à %Hh%M").to_string(),
        },
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
