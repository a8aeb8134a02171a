use xxhash_rust::xxh3::Xxh3;

use crate::composition::model::{PitchAlgorithm, Transition};
use crate::foundation::time::{MediaTime, TimeRange};
use crate::layout::instructions::Instruction;
use crate::layout::plan::CompositionPlan;
use crate::layout::tracks::{MediaKind, TrackId, TrackRole, TrackTable};

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// 128-bit digest of a layout result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlanFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for PlanFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl CompositionPlan {
    /// Stable digest over breakpoints, ranges, instructions, tracks and audio mix.
    /// Equal plans always give equal fingerprints.
    pub fn fingerprint(&self) -> PlanFingerprint {
        fingerprint_plan(self)
    }
}

pub(crate) fn fingerprint_plan(plan: &CompositionPlan) -> PlanFingerprint {
    let mut h = StableHasher::new();
    write_plan(&mut h, plan);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> PlanFingerprint {
        let v = self.inner.digest128();
        PlanFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_plan(h: &mut StableHasher, plan: &CompositionPlan) {
    h.write_u32(plan.layout.breakpoints.len() as u32);
    for t in &plan.layout.breakpoints {
        write_time(h, *t);
    }
    write_ranges(h, &plan.layout.passthrough_ranges);
    write_ranges(h, &plan.layout.transition_ranges);

    h.write_u32(plan.layers.len() as u32);
    for layer in &plan.layers {
        h.write_u32(layer.id.0);
        h.write_str(&layer.key);
        h.write_u32(layer.z_level as u32);
        write_range(h, layer.placement);
        write_transition(h, &layer.transition);
    }

    write_tracks(h, &plan.tracks);

    h.write_u32(plan.instructions.len() as u32);
    for ins in &plan.instructions {
        write_instruction(h, ins);
    }

    h.write_u32(plan.audio_mix.inputs.len() as u32);
    for input in &plan.audio_mix.inputs {
        write_track_id(h, input.track);
        h.write_u32(input.layer.0);
        write_range(h, input.range);
        h.write_f32(input.volume);
        write_pitch(h, input.pitch);
    }
}

fn write_time(h: &mut StableHasher, t: MediaTime) {
    h.write_i64(t.ticks());
}

fn write_range(h: &mut StableHasher, r: TimeRange) {
    write_time(h, r.start);
    write_time(h, r.end);
}

fn write_ranges(h: &mut StableHasher, ranges: &[TimeRange]) {
    h.write_u32(ranges.len() as u32);
    for r in ranges {
        write_range(h, *r);
    }
}

fn write_track_id(h: &mut StableHasher, id: TrackId) {
    h.write_u32(id.0);
}

fn write_opt_track(h: &mut StableHasher, id: Option<TrackId>) {
    match id {
        Some(id) => {
            h.write_u8(1);
            write_track_id(h, id);
        }
        None => h.write_u8(0),
    }
}

fn write_transition(h: &mut StableHasher, tr: &Transition) {
    match &tr.effect {
        Some(effect) => {
            h.write_u8(1);
            h.write_str(effect);
        }
        None => h.write_u8(0),
    }
    write_time(h, tr.duration);
}

fn write_tracks(h: &mut StableHasher, table: &TrackTable) {
    h.write_u32(table.tracks.len() as u32);
    for t in &table.tracks {
        write_track_id(h, t.id);
        h.write_u8(match t.kind {
            MediaKind::Video => 0,
            MediaKind::Audio => 1,
        });
        h.write_u8(match t.role {
            TrackRole::Layer => 0,
            TrackRole::Transition => 1,
            TrackRole::Blank => 2,
        });
        write_time(h, t.last_occupied_end);
    }

    h.write_u32(table.assignments.len() as u32);
    for (layer, tracks) in &table.assignments {
        h.write_u32(layer.0);
        write_opt_track(h, tracks.video);
        write_opt_track(h, tracks.audio);
    }

    match table.transition_tracks {
        Some([a, b]) => {
            h.write_u8(1);
            write_track_id(h, a);
            write_track_id(h, b);
        }
        None => h.write_u8(0),
    }

    match &table.blank {
        Some(blank) => {
            h.write_u8(1);
            write_track_id(h, blank.track);
            write_range(h, blank.range);
            write_time(h, blank.inserted);
            h.write_f64(blank.scale);
        }
        None => h.write_u8(0),
    }
}

fn write_instruction(h: &mut StableHasher, ins: &Instruction) {
    write_range(h, ins.range);
    h.write_u32(ins.layers.len() as u32);
    for id in &ins.layers {
        h.write_u32(id.0);
    }
    h.write_bool(ins.is_transition);
    write_opt_track(h, ins.foreground_track);
    write_opt_track(h, ins.background_track);
    write_opt_track(h, ins.passthrough_track);
    write_transition(h, &ins.transition);
    match ins.transition_range {
        Some(r) => {
            h.write_u8(1);
            write_range(h, r);
        }
        None => h.write_u8(0),
    }
}

fn write_pitch(h: &mut StableHasher, p: PitchAlgorithm) {
    h.write_u8(match p {
        PitchAlgorithm::Spectral => 0,
        PitchAlgorithm::TimeDomain => 1,
        PitchAlgorithm::Varispeed => 2,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
