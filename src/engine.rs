//! The detection engine: a single-threaded, pure state machine threading
//! one `ProcessingState` through trigger, validation, backtrack and
//! reprocessing.
//!
//! There are no suspension points inside [`Engine::process`]; the caller
//! drives it one input sample at a time and gets back zero or more
//! output rows, emitted in strict input order (§5, §8 invariant 1 & 7).

use std::collections::VecDeque;

use crate::config::Config;
use crate::detectors;
use crate::error::EngineError;
use crate::event_state::EventStates;
use crate::events::{DetectedEvents, EventType, FlightEvent};
use crate::inflection;
use crate::output::{self, Output};
use crate::preprocessor;
use crate::sample::{InputSample, Kinematics, Timestamp};
use crate::window::median;

/// `Streaming` or mid-validation for a specific event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Streaming,
    Validation {
        remaining: u32,
        event_type: EventType,
        /// Index of the sample whose trigger predicate fired, i.e. the
        /// one whose backtrack window anchors the inflection search.
        /// Not generally `buffer.front()`: the buffer may already carry
        /// pre-trigger history retained for this exact purpose.
        trigger_index: u64,
        /// Freefall only: latched once `freefall::validate` has held for
        /// any sample seen so far in this window, not only the one at
        /// its end. A hop-and-pop freefall can end (canopy opens) well
        /// before an 8s validation window elapses, so checking only the
        /// window's last sample would see canopy's steady state instead
        /// of the freefall that actually happened. See DESIGN.md.
        confirmed: bool,
    },
}

/// A full snapshot of the engine's per-sample state, stored in the
/// pending buffer so validation can backtrack to it and reprocessing can
/// resume from its exact historical windows.
#[derive(Debug, Clone)]
pub struct ProcessingState<T: Timestamp, S> {
    pub index: u64,
    pub input: InputSample<T, S>,
    pub kinematics: Kinematics,
    pub detected_events: DetectedEvents,
    pub event_states: EventStates,
}

/// The streaming flight-phase detection engine. Generic over the
/// timestamp type `T` and an opaque per-sample `source` payload `S` the
/// engine carries through unchanged.
pub struct Engine<T: Timestamp, S: Clone> {
    config: Config,
    stream_phase: StreamPhase,
    pending_buffer: VecDeque<ProcessingState<T, S>>,
    reinjection_queue: VecDeque<InputSample<T, S>>,
    previous_input: Option<InputSample<T, S>>,
    previous_kinematics: Option<Kinematics>,
    event_states: EventStates,
    detected_events: DetectedEvents,
    next_index: u64,
}

impl<T: Timestamp, S: Clone> Engine<T, S> {
    pub fn new(config: Config) -> Self {
        let event_states = EventStates::new(&config);
        Self {
            config,
            stream_phase: StreamPhase::Streaming,
            pending_buffer: VecDeque::new(),
            reinjection_queue: VecDeque::new(),
            previous_input: None,
            previous_kinematics: None,
            event_states,
            detected_events: DetectedEvents::default(),
            next_index: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Feed one externally-arriving sample through the engine, draining
    /// any internally re-injected samples from a prior validation success
    /// first so every sample is processed in strict index order.
    pub fn process(&mut self, sample: InputSample<T, S>) -> Result<Vec<Output<S>>, EngineError> {
        let mut outputs = Vec::new();
        self.reinjection_queue.push_back(sample);
        while let Some(next) = self.reinjection_queue.pop_front() {
            outputs.extend(self.ingest_one(next)?);
        }
        Ok(outputs)
    }

    /// Consume the engine at end of input, flushing whatever remains.
    /// A dangling validation is treated as a failure per §4.6: the
    /// buffer is released unchanged.
    pub fn finish(self) -> Vec<Output<S>> {
        self.pending_buffer
            .into_iter()
            .map(|state| output::assemble(state.index, state.detected_events, state.input.source))
            .collect()
    }

    fn ingest_one(&mut self, input: InputSample<T, S>) -> Result<Vec<Output<S>>, EngineError> {
        let index = self.next_index;
        self.next_index += 1;

        let kinematics = preprocessor::process(
            index,
            &input,
            self.previous_input.as_ref(),
            self.previous_kinematics.as_ref(),
            &self.config,
        )?;

        let previous_freefall_median = median(&self.event_states.freefall.smoothing);
        self.event_states.push_all(index, &kinematics);

        let state = ProcessingState {
            index,
            input: input.clone(),
            kinematics,
            detected_events: self.detected_events,
            event_states: self.event_states.clone(),
        };

        self.previous_input = Some(input);
        self.previous_kinematics = Some(kinematics);

        match self.stream_phase {
            StreamPhase::Streaming => Ok(self.step_streaming(state, previous_freefall_median)),
            StreamPhase::Validation {
                remaining,
                event_type,
                trigger_index,
                confirmed,
            } => {
                self.pending_buffer.push_back(state);
                let confirmed = confirmed
                    || (event_type == EventType::Freefall
                        && self.validation_holds(
                            event_type,
                            self.pending_buffer.back().expect("just pushed"),
                        ));
                debug_assert!(
                    self.pending_buffer.len()
                        <= self.config.max_backtrack_window_size()
                            + self.config.max_validation_window_size() as usize,
                    "pending buffer exceeded its configured bound (invariant 6)",
                );
                if remaining <= 1 {
                    Ok(self.evaluate_validation(event_type, trigger_index, confirmed))
                } else {
                    self.stream_phase = StreamPhase::Validation {
                        remaining: remaining - 1,
                        event_type,
                        trigger_index,
                        confirmed,
                    };
                    Ok(Vec::new())
                }
            }
        }
    }

    fn step_streaming(
        &mut self,
        state: ProcessingState<T, S>,
        previous_freefall_median: f64,
    ) -> Vec<Output<S>> {
        let candidate = EventType::ALL_IN_PRIORITY_ORDER
            .into_iter()
            .find(|&et| self.candidate_fires(et, &state, previous_freefall_median));

        let trigger_index = state.index;
        self.pending_buffer.push_back(state);

        if let Some(event_type) = candidate {
            self.stream_phase = StreamPhase::Validation {
                remaining: self.config.validation_window_size(event_type),
                event_type,
                trigger_index,
                confirmed: false,
            };
            return Vec::new();
        }

        let backtrack_cap = EventType::ALL_IN_PRIORITY_ORDER
            .into_iter()
            .find(|&et| self.detected_events.is_eligible(et))
            .map(|et| self.config.backtrack_window_size(et))
            .unwrap_or(0);

        let mut outputs = Vec::new();
        while self.pending_buffer.len() > backtrack_cap {
            let oldest = self.pending_buffer.pop_front().expect("buffer non-empty");
            outputs.push(output::assemble(
                oldest.index,
                oldest.detected_events,
                oldest.input.source,
            ));
        }
        outputs
    }

    fn candidate_fires(
        &self,
        event_type: EventType,
        state: &ProcessingState<T, S>,
        previous_freefall_median: f64,
    ) -> bool {
        if !state.detected_events.is_eligible(event_type) {
            return false;
        }
        match event_type {
            EventType::Takeoff => {
                detectors::takeoff::trigger(
                    &state.event_states.takeoff,
                    &state.kinematics,
                    &self.config.takeoff,
                ) && detectors::takeoff::constraints(
                    &state.detected_events,
                    &state.kinematics,
                    &self.config.takeoff,
                )
            }
            EventType::Freefall => {
                detectors::freefall::trigger(
                    &state.event_states.freefall,
                    previous_freefall_median,
                    &state.kinematics,
                    &self.config.freefall,
                ) && detectors::freefall::constraints(
                    &state.detected_events,
                    &state.kinematics,
                    state.index,
                    &self.config.freefall,
                )
            }
            EventType::Canopy => {
                detectors::canopy::trigger(&state.event_states.canopy, &self.config.canopy)
                    && detectors::canopy::constraints(
                        &state.detected_events,
                        &state.kinematics,
                        state.index,
                        &self.config.canopy,
                    )
            }
            EventType::Landing => {
                detectors::landing::trigger(
                    &state.event_states.landing,
                    &state.kinematics,
                    &self.config.landing,
                ) && detectors::landing::constraints(
                    &state.detected_events,
                    &state.kinematics,
                    state.index,
                    &self.config.landing,
                )
            }
        }
    }

    fn validation_holds(&self, event_type: EventType, state: &ProcessingState<T, S>) -> bool {
        match event_type {
            EventType::Takeoff => {
                detectors::takeoff::validate(&state.event_states.takeoff, &self.config.takeoff)
            }
            EventType::Freefall => {
                detectors::freefall::validate(&state.event_states.freefall, &self.config.freefall)
            }
            EventType::Canopy => {
                detectors::canopy::validate(&state.event_states.canopy, &self.config.canopy)
            }
            EventType::Landing => detectors::landing::validate(
                &state.event_states.landing,
                &state.kinematics,
                &self.config.landing,
            ),
        }
    }

    /// The buffer is full (this sample was the last of the validation
    /// window). Either commit the event (backtracking to its true
    /// inflection and reprocessing what follows) or release the buffer
    /// unchanged. For every event type but Freefall, success is the
    /// validation predicate evaluated on the buffer's newest entry;
    /// Freefall instead uses `confirmed`, latched true the moment the
    /// predicate held at any sample in the window (see `StreamPhase::Validation`).
    fn evaluate_validation(
        &mut self,
        event_type: EventType,
        trigger_index: u64,
        confirmed: bool,
    ) -> Vec<Output<S>> {
        let success = match event_type {
            EventType::Freefall => confirmed,
            _ => {
                let last = self.pending_buffer.back().expect("buffer non-empty at validation end");
                self.validation_holds(event_type, last)
            }
        };

        if success {
            self.commit_validated_event(event_type, trigger_index)
        } else {
            self.release_rejected_buffer(trigger_index)
        }
    }

    fn commit_validated_event(&mut self, event_type: EventType, trigger_index: u64) -> Vec<Output<S>> {
        // Vertical speed is positive-down (§3 Glossary: "descending" reads
        // positive). Freefall's onset is vertical speed climbing toward a
        // larger positive number, the only rising transition among the
        // four; Takeoff, Canopy and Landing all begin with vertical speed
        // dropping toward a smaller (more negative, or less positive)
        // value, a falling transition.
        let is_rising = matches!(event_type, EventType::Freefall);
        let min_speed_delta = self.config.global.inflection_min_speed_delta;

        let trigger_state = self
            .pending_buffer
            .iter()
            .find(|s| s.index == trigger_index)
            .expect("trigger sample remains in buffer until validation resolves");
        let inflection_sample = inflection::find(
            &trigger_state.event_states.get(event_type).backtrack,
            is_rising,
            min_speed_delta,
        )
        .expect("trigger state always contributes at least one backtrack sample");
        let inflection_event = FlightEvent {
            index: inflection_sample.index,
            altitude: inflection_sample.corrected_altitude,
        };

        let resume_buffer_index = self
            .pending_buffer
            .iter()
            .position(|s| s.index > inflection_event.index)
            .unwrap_or(self.pending_buffer.len() - 1);

        let buffer = std::mem::take(&mut self.pending_buffer);
        let mut buffer: Vec<_> = buffer.into_iter().collect();
        let resume_index = buffer[resume_buffer_index].index;

        // Only rows up to and including the resume point are emitted here.
        // Everything after it is reinjected below and reprocessed under
        // normal streaming rules, which emits each of those rows exactly
        // once; emitting them here too would double-emit and break
        // output ordering (§8 invariant 1).
        let outputs: Vec<Output<S>> = buffer
            .iter()
            .filter(|buffered| buffered.index <= resume_index)
            .map(|buffered| {
                let events = if buffered.index >= inflection_event.index {
                    buffered.detected_events.with_set(event_type, inflection_event)
                } else {
                    buffered.detected_events
                };
                output::assemble(buffered.index, events, buffered.input.source.clone())
            })
            .collect();

        let resume_state = buffer.remove(resume_buffer_index);
        let reinjected: Vec<InputSample<T, S>> = buffer
            .into_iter()
            .filter(|s| s.index > resume_state.index)
            .map(|s| s.input)
            .collect();

        self.resume_from(
            resume_state.index,
            resume_state.input,
            resume_state.kinematics,
            resume_state.detected_events.with_set(event_type, inflection_event),
            resume_state.event_states,
            reinjected,
        );

        outputs
    }

    fn release_rejected_buffer(&mut self, trigger_index: u64) -> Vec<Output<S>> {
        let buffer: Vec<_> = std::mem::take(&mut self.pending_buffer).into_iter().collect();
        // The trigger sample (wherever it sits in the buffer) is released
        // with no event attached and is never re-examined for this event
        // type; resumption continues from the sample right after it.
        let trigger_position = buffer
            .iter()
            .position(|s| s.index == trigger_index)
            .expect("trigger sample remains in buffer until validation resolves");
        let resume_position = if trigger_position + 1 < buffer.len() {
            trigger_position + 1
        } else {
            buffer.len() - 1
        };
        let resume_index = buffer[resume_position].index;

        // Only rows up to and including the resume point are emitted here;
        // the tail is reinjected below and reprocessed under normal
        // streaming rules, which emits it exactly once (see the matching
        // comment in `commit_validated_event`).
        let outputs: Vec<Output<S>> = buffer
            .iter()
            .filter(|buffered| buffered.index <= resume_index)
            .map(|buffered| {
                output::assemble(
                    buffered.index,
                    buffered.detected_events,
                    buffered.input.source.clone(),
                )
            })
            .collect();

        let resume_state = buffer[resume_position].clone();
        let reinjected: Vec<InputSample<T, S>> = buffer
            .into_iter()
            .filter(|s| s.index > resume_state.index)
            .map(|s| s.input)
            .collect();

        self.resume_from(
            resume_state.index,
            resume_state.input,
            resume_state.kinematics,
            resume_state.detected_events,
            resume_state.event_states,
            reinjected,
        );

        outputs
    }

    fn resume_from(
        &mut self,
        resume_index: u64,
        resume_input: InputSample<T, S>,
        resume_kinematics: Kinematics,
        resume_detected_events: DetectedEvents,
        resume_event_states: EventStates,
        reinjected: Vec<InputSample<T, S>>,
    ) {
        self.previous_input = Some(resume_input);
        self.previous_kinematics = Some(resume_kinematics);
        self.detected_events = resume_detected_events;
        self.event_states = resume_event_states;
        self.next_index = resume_index + 1;
        self.stream_phase = StreamPhase::Streaming;
        self.pending_buffer.clear();

        for sample in reinjected.into_iter().rev() {
            self.reinjection_queue.push_front(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, altitude: f64, north: f64, east: f64, vertical: f64) -> InputSample<f64, u64> {
        InputSample {
            time,
            altitude,
            north_speed: north,
            east_speed: east,
            vertical_speed: vertical,
            source: 0,
        }
    }

    /// A short synthetic freefall matching the spec's backtrack-correctness
    /// scenario: vertical speed ramps 5 -> 55 m/s starting at index 100.
    #[test]
    fn backtrack_relocates_freefall_to_first_rising_sample() {
        let mut config = Config::default();
        config.freefall.validation_window_size = 5;
        config.freefall.smoothing_window_size = 1;
        config.freefall.backtrack_window_size = 15;
        config.freefall.min_altitude_absolute = 0.0;
        let mut engine: Engine<f64, u64> = Engine::new(config);

        let mut all_outputs = Vec::new();
        let mut t = 0.0;
        // 100 flat samples (no motion) so the freefall window only sees
        // the ramp once it begins.
        for i in 0..100u64 {
            let out = engine.process(sample(t, 3000.0, 0.0, 0.0, 5.0)).unwrap();
            all_outputs.extend(out.into_iter().map(|o| (i, o)));
            t += 0.2;
        }
        let ramp = [5.0, 5.0, 5.0, 8.0, 15.0, 22.0, 28.0, 35.0, 42.0, 50.0, 55.0, 55.0, 55.0, 55.0, 55.0, 55.0, 55.0, 55.0];
        for v in ramp {
            let out = engine.process(sample(t, 3000.0, 0.0, 0.0, v)).unwrap();
            all_outputs.extend(out);
            t += 0.2;
        }
        let tail = engine.finish();
        all_outputs.extend(tail);

        let freefall_index = all_outputs
            .iter()
            .find_map(|o| o.events.freefall.map(|e| e.index))
            .expect("freefall should be detected");
        assert_eq!(freefall_index, 103);
    }

    /// §8 invariants 1 & 7: a successful validation must not double-emit
    /// the reinjected tail, and output indices must stay strictly
    /// increasing across the commit/reprocess boundary.
    #[test]
    fn committing_a_validated_event_emits_each_row_exactly_once_in_order() {
        let mut config = Config::default();
        config.freefall.validation_window_size = 5;
        config.freefall.smoothing_window_size = 1;
        config.freefall.backtrack_window_size = 15;
        config.freefall.min_altitude_absolute = 0.0;
        let mut engine: Engine<f64, u64> = Engine::new(config);

        let mut all_outputs = Vec::new();
        let mut t = 0.0;
        let mut total_inputs = 0usize;
        for _ in 0..100u64 {
            all_outputs.extend(engine.process(sample(t, 3000.0, 0.0, 0.0, 5.0)).unwrap());
            total_inputs += 1;
            t += 0.2;
        }
        let ramp = [5.0, 5.0, 5.0, 8.0, 15.0, 22.0, 28.0, 35.0, 42.0, 50.0, 55.0, 55.0, 55.0, 55.0, 55.0, 55.0, 55.0, 55.0];
        for v in ramp {
            all_outputs.extend(engine.process(sample(t, 3000.0, 0.0, 0.0, v)).unwrap());
            total_inputs += 1;
            t += 0.2;
        }
        all_outputs.extend(engine.finish());

        assert_eq!(all_outputs.len(), total_inputs, "every input row must be emitted exactly once");
        for (expected_index, output) in all_outputs.iter().enumerate() {
            assert_eq!(
                output.index, expected_index as u64,
                "output indices must be contiguous and strictly increasing, no duplicates or gaps"
            );
        }
    }

    #[test]
    fn spike_only_stream_detects_nothing() {
        let config = Config::default();
        let mut engine: Engine<f64, u64> = Engine::new(config);
        let mut t = 0.0;
        let mut outputs = Vec::new();
        for i in 0..500u64 {
            let vertical = if (400..403).contains(&i) { 150.0 } else { 0.0 };
            let out = engine.process(sample(t, 120.0, 0.0, 0.0, vertical)).unwrap();
            outputs.extend(out);
            t += 0.2;
        }
        outputs.extend(engine.finish());
        assert_eq!(outputs.len(), 500);
        for o in &outputs {
            assert_eq!(o.phase, crate::events::FlightPhase::BeforeTakeoff);
            assert!(o.events.takeoff.is_none());
            assert!(o.events.freefall.is_none());
        }
    }

    #[test]
    fn output_length_always_equals_input_length() {
        let config = Config::default();
        let mut engine: Engine<f64, u64> = Engine::new(config);
        let mut t = 0.0;
        let mut count = 0usize;
        for _ in 0..300u64 {
            let out = engine.process(sample(t, 1000.0, 10.0, 0.0, 1.0)).unwrap();
            count += out.len();
            t += 0.2;
        }
        count += engine.finish().len();
        assert_eq!(count, 300);
    }

    #[test]
    fn non_monotonic_timestamp_surfaces_as_engine_error() {
        let config = Config::default();
        let mut engine: Engine<f64, u64> = Engine::new(config);
        engine.process(sample(1.0, 100.0, 0.0, 0.0, 0.0)).unwrap();
        let err = engine.process(sample(0.5, 100.0, 0.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }
}
