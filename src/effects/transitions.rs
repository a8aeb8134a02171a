use std::collections::BTreeMap;

use crate::{
    composition::model::Transition,
    foundation::error::{StrataError, StrataResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeDir {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

/// Renderable effect an effect id resolves to. Layout never looks inside it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionKind {
    Crossfade,
    Wipe { dir: WipeDir, soft_edge: f32 },
    Slide { dir: WipeDir },
}

/// JSON form of a registry entry: `{ "kind": "wipe", "params": { "dir": "ltr" } }`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EffectSpec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

fn parse_dir(
    params: Option<&serde_json::Map<String, serde_json::Value>>,
    what: &str,
) -> StrataResult<WipeDir> {
    match params.and_then(|p| p.get("dir")).and_then(|v| v.as_str()) {
        None => Ok(WipeDir::LeftToRight),
        Some(s) => match s.trim().to_ascii_lowercase().as_str() {
            "left_to_right" | "lefttoright" | "ltr" => Ok(WipeDir::LeftToRight),
            "right_to_left" | "righttoleft" | "rtl" => Ok(WipeDir::RightToLeft),
            "top_to_bottom" | "toptobottom" | "ttb" => Ok(WipeDir::TopToBottom),
            "bottom_to_top" | "bottomtotop" | "btt" => Ok(WipeDir::BottomToTop),
            other => Err(StrataError::validation(format!(
                "unknown {what}.dir '{other}'"
            ))),
        },
    }
}

pub fn parse_transition_kind_params(
    kind: &str,
    params: &serde_json::Value,
) -> StrataResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(StrataError::validation("transition kind must be non-empty"));
    }

    let params = if params.is_null() {
        None
    } else {
        Some(params.as_object().ok_or_else(|| {
            StrataError::validation(format!("{kind} params must be an object"))
        })?)
    };

    match kind.as_str() {
        "crossfade" | "fade" | "dissolve" => Ok(TransitionKind::Crossfade),
        "wipe" => {
            let dir = parse_dir(params, "wipe")?;
            let soft_edge = match params
                .and_then(|p| p.get("soft_edge"))
                .and_then(|v| v.as_f64())
            {
                None => 0.0,
                Some(v) => {
                    let f = v as f32;
                    if !f.is_finite() {
                        return Err(StrataError::validation(
                            "wipe.soft_edge must be finite when set",
                        ));
                    }
                    f.clamp(0.0, 1.0)
                }
            };
            Ok(TransitionKind::Wipe { dir, soft_edge })
        }
        "slide" => Ok(TransitionKind::Slide {
            dir: parse_dir(params, "slide")?,
        }),
        _ => Err(StrataError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

pub fn parse_effect_spec(spec: &EffectSpec) -> StrataResult<TransitionKind> {
    parse_transition_kind_params(&spec.kind, &spec.params)
}

/// Resolves transition effect ids to renderable effects.
#[derive(Clone, Debug, Default)]
pub struct TransitionRegistry {
    effects: BTreeMap<String, TransitionKind>,
}

impl TransitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `crossfade`, `wipe` and `slide` under their own names.
    pub fn with_builtins() -> Self {
        let mut effects = BTreeMap::new();
        effects.insert("crossfade".to_string(), TransitionKind::Crossfade);
        effects.insert(
            "wipe".to_string(),
            TransitionKind::Wipe {
                dir: WipeDir::LeftToRight,
                soft_edge: 0.0,
            },
        );
        effects.insert(
            "slide".to_string(),
            TransitionKind::Slide {
                dir: WipeDir::LeftToRight,
            },
        );
        Self { effects }
    }

    /// Register `kind` under `effect`. Ids are unique.
    pub fn register(
        &mut self,
        effect: impl Into<String>,
        kind: TransitionKind,
    ) -> StrataResult<()> {
        let effect = effect.into();
        if effect.trim().is_empty() {
            return Err(StrataError::validation("transition effect id must be non-empty"));
        }
        if self.effects.contains_key(&effect) {
            return Err(StrataError::validation(format!(
                "duplicate transition effect id '{effect}'"
            )));
        }
        self.effects.insert(effect, kind);
        Ok(())
    }

    pub fn register_spec(
        &mut self,
        effect: impl Into<String>,
        spec: &EffectSpec,
    ) -> StrataResult<()> {
        let kind = parse_effect_spec(spec)?;
        self.register(effect, kind)
    }

    pub fn get(&self, effect: &str) -> Option<&TransitionKind> {
        self.effects.get(effect)
    }

    /// Resolve a transition. The identity transition resolves to `None`; an unknown id
    /// is an error.
    pub fn resolve(&self, transition: &Transition) -> StrataResult<Option<TransitionKind>> {
        if !transition.is_animated() {
            return Ok(None);
        }
        let Some(effect) = transition.effect.as_deref() else {
            return Ok(None);
        };
        self.effects
            .get(effect)
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                StrataError::validation(format!("unknown transition effect '{effect}'"))
            })
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
