//! Static lookup tables for the upstream enum-coded fields.
//!
//! Exhaustive `match`-based constants with `Option` returns: an unknown
//! key is never a panic, the caller falls back to displaying the raw
//! code. Labels are French, as served by the API itself.

/// Event code to `(message, lifecycle step 1–5)`. Used only when the
/// API omits the human label on an event.
#[must_use]
pub fn event_message(code: &str) -> Option<(&'static str, u8)> {
    match code {
        "DR1" => Some(("Déclaratif réceptionné", 1)),
        "PC1" => Some(("Pris en charge", 2)),
        "PC2" => Some(("Pris en charge dans le pays d’expédition", 2)),
        "ET1" => Some(("En cours de traitement", 3)),
        "ET2" => Some(("En cours de traitement dans le pays d’expédition", 3)),
        "ET3" => Some(("En cours de traitement dans le pays de destination", 3)),
        "ET4" => Some(("En cours de traitement dans un pays de transit", 3)),
        "EP1" => Some(("En attente de présentation", 3)),
        "DO1" => Some(("Entrée en Douane", 3)),
        "DO2" => Some(("Sortie de Douane", 3)),
        "DO3" => Some(("Retenu en Douane", 3)),
        "PB1" => Some(("Problème en cours", 3)),
        "PB2" => Some(("Problème résolu", 3)),
        "MD2" => Some(("Mis en distribution", 4)),
        "ND1" => Some(("Non distribuable", 4)),
        "AG1" => Some(("En attente d’être retiré au guichet", 4)),
        "RE1" => Some(("Retourné à l’expéditeur", 4)),
        "DI1" => Some(("Distribué", 5)),
        "DI2" => Some(("Distribué à l’expéditeur", 5)),
        _ => None,
    }
}

/// Organizational entity currently responsible for the shipment.
#[must_use]
pub const fn holder_label(code: u8) -> Option<&'static str> {
    match code {
        1 => Some("Courrier national"),
        2 => Some("Courrier international"),
        3 => Some("Chronopost"),
        4 => Some("Colissimo"),
        _ => None,
    }
}

/// Delivery-choice state. Code 0 means no choice and renders nothing.
#[must_use]
pub const fn delivery_choice_label(code: u8) -> Option<&'static str> {
    match code {
        1 => Some("Possible"),
        2 => Some("Choisi"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_event_codes_resolve() {
        assert_eq!(event_message("DI1"), Some(("Distribué", 5)));
        assert_eq!(event_message("DR1"), Some(("Déclaratif réceptionné", 1)));
        assert_eq!(event_message("AG1").unwrap().1, 4);
    }

    #[test]
    fn unknown_event_code_is_none() {
        assert!(event_message("ZZ9").is_none());
        assert!(event_message("").is_none());
    }

    #[test]
    fn holder_codes() {
        assert_eq!(holder_label(1), Some("Courrier national"));
        assert_eq!(holder_label(4), Some("Colissimo"));
        assert!(holder_label(0).is_none());
        assert!(holder_label(5).is_none());
    }

    #[test]
    fn delivery_choice_zero_renders_nothing() {
        assert!(delivery_choice_label(0).is_none());
        assert_eq!(delivery_choice_label(2), Some("Choisi"));
    }
}
