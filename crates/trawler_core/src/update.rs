use crate::{parse_label, EnumState, Effect, Msg, SkipReason};

/// Pure update function: applies a message to state and returns any effects.
///
/// Effects are returned in execution order. An `Acquire` always precedes the
/// `Advance` or `Finish` of the same step, so the engine blocks on the
/// transfer before moving the cursor.
pub fn update(mut state: EnumState, msg: Msg) -> (EnumState, Vec<Effect>) {
    if state.is_finished() {
        if let Msg::AcquisitionFinished { identity, outcome } = msg {
            state.record(identity, outcome);
        }
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::LabelRead(label) => {
            state.begin_step();
            let mut effects = Vec::with_capacity(2);
            match label.as_deref() {
                Some(raw) => {
                    if let Some(effect) = classify(&mut state, raw) {
                        effects.push(effect);
                    }
                }
                None => state.note_unreadable(),
            }

            let unchanged = state.track_label(label);
            if unchanged >= state.settings().unchanged_limit {
                state.finish();
                effects.push(Effect::Finish {
                    unchanged_steps: unchanged,
                });
            } else {
                effects.push(Effect::Advance);
            }
            effects
        }
        Msg::ReadFailed { reason } => {
            let failures = state.note_read_failure();
            let limit = state.settings().max_read_failures;
            if limit > 0 && failures >= limit {
                let reason = format!("{failures} consecutive unreadable entries, last: {reason}");
                state.abort(reason.clone());
                vec![Effect::Abort { reason }]
            } else {
                // Re-read the same entry; the unchanged counter is left alone.
                Vec::new()
            }
        }
        Msg::AcquisitionFinished { identity, outcome } => {
            state.record(identity, outcome);
            Vec::new()
        }
    };

    (state, effects)
}

fn classify(state: &mut EnumState, raw: &str) -> Option<Effect> {
    let identity = match parse_label(raw, state.settings().separator) {
        Ok(identity) => identity,
        Err(err) => {
            state.note_unreadable();
            return Some(Effect::Skip {
                label: raw.to_string(),
                reason: SkipReason::Unparseable(err),
            });
        }
    };

    if !identity.has_extension(&state.settings().extension) {
        state.note_filtered();
        return Some(Effect::Skip {
            label: identity.into_string(),
            reason: SkipReason::ExtensionMismatch,
        });
    }

    if state.master().contains(identity.as_str()) {
        state.note_duplicate();
        return Some(Effect::Skip {
            label: identity.into_string(),
            reason: SkipReason::Duplicate,
        });
    }

    state.accept(identity.clone());
    Some(Effect::Acquire { identity })
}
