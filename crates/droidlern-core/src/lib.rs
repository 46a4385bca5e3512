//! Gemeinsame Typen und Traits für droidlern.
//!
//! Ein Android-Gerät wird als RL-Umgebung betrachtet: ein Agent schickt
//! [`Action`]s, bekommt eine [`Observation`] (Bildschirmfoto plus Mittelpunkte
//! der sichtbaren UI-Elemente) und einen Reward, der aus dem System-Log des
//! Geräts abgeleitet wird.

pub mod action;
pub mod diag;

pub use action::{Action, ActionError, Cell, Direction, Point, RawAction};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Feste Anzahl an Element-Koordinaten pro Beobachtung.
pub const OBSERVATION_SLOTS: usize = 512;

/// Bildschirmgröße in Pixeln.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Noch nicht gelesene Log-Zeilen, die ein Reward-Aufruf konsumieren darf.
pub type LogLines = std::vec::IntoIter<String>;

/// Eine Beobachtung: RGB-Bild (H×W×3) plus genau [`OBSERVATION_SLOTS`]
/// Element-Mittelpunkte, mit `0` aufgefüllt.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub image: RgbImage,
    pub posx: Vec<i32>,
    pub posy: Vec<i32>,
}

impl Observation {
    /// Anzahl der Slots, die nicht auf `(0, 0)` stehen.
    pub fn element_count(&self) -> usize {
        self.posx
            .iter()
            .zip(&self.posy)
            .filter(|(x, y)| **x != 0 || **y != 0)
            .count()
    }
}

/// Zusatzinformationen eines Schritts. Der Kern befüllt sie nie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Info(pub BTreeMap<String, Value>);

/// Ergebnis von [`Environment::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

/// Berechnet den Reward aus frisch gelesenen Log-Zeilen.
///
/// Eigener Zustand (z. B. Schlüsselwort-Zähler) gehört der Implementierung;
/// bereits gelesene Zeilen werden nicht erneut geliefert.
pub trait Reward {
    fn reward(&mut self, lines: LogLines) -> f32;
}

impl<F> Reward for F
where
    F: FnMut(LogLines) -> f32,
{
    fn reward(&mut self, lines: LogLines) -> f32 {
        self(lines)
    }
}

/// step/reset/render-Vertrag einer Umgebung.
pub trait Environment {
    type Action;

    fn reset(&mut self) -> (Observation, Info);
    fn step(&mut self, action: &Self::Action) -> Step;
    fn render(&mut self) -> RgbImage;
    /// Bildschirmgröße des zugrunde liegenden Geräts.
    fn screen_size(&self) -> Size;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_reward_functions() {
        let mut seen = 0usize;
        let mut reward = |lines: LogLines| {
            let n = lines.count();
            seen += n;
            n as f32 * 0.5
        };
        let batch = vec!["a".to_string(), "b".to_string()].into_iter();
        assert!((Reward::reward(&mut reward, batch) - 1.0).abs() < f32::EPSILON);
        assert!((Reward::reward(&mut reward, Vec::new().into_iter())).abs() < f32::EPSILON);
        drop(reward);
        assert_eq!(seen, 2);
    }

    #[test]
    fn element_count_ignores_padding() {
        let mut posx = vec![0; OBSERVATION_SLOTS];
        let mut posy = vec![0; OBSERVATION_SLOTS];
        posx[0] = 10;
        posy[1] = 4;
        let obs = Observation {
            image: RgbImage::new(2, 2),
            posx,
            posy,
        };
        assert_eq!(obs.element_count(), 2);
    }

    #[test]
    fn info_serializes_as_plain_map() {
        let info = Info::default();
        assert_eq!(serde_json::to_string(&info).unwrap(), "{}");
    }
}
