use tracing::debug;

use super::{ContractError, Dependencies, Event, EventRegistry, RawEvent, Record};
use crate::abi::{AbiEventParameter, AbiParameter};

/// Fixed-width type an indexed dynamic value is logged as.
const INDEXED_WORD: &str = "bytes32";

/// Type used to decode `parameter` from a log.
///
/// Indexed strings, byte strings, tuples and arrays are only present in the
/// topics as a 32-byte hash, so they decode as `bytes32`. Everything else
/// keeps its declared type.
pub fn type_for_event_decoding(parameter: &AbiEventParameter) -> AbiParameter {
    let declared = &parameter.parameter;
    let hashed = parameter.indexed
        && (declared.ty == "string"
            || declared.ty == "bytes"
            || declared.is_tuple()
            || declared.is_array());

    if hashed {
        AbiParameter::new(declared.name.clone(), INDEXED_WORD)
    } else {
        declared.clone()
    }
}

/// Rebuilds [`Event`]s from raw logs.
pub struct EventDecoder<'a, D: Dependencies + ?Sized> {
    registry: &'a EventRegistry,
    dependencies: &'a D,
}

impl<'a, D: Dependencies + ?Sized> EventDecoder<'a, D> {
    pub fn new(registry: &'a EventRegistry, dependencies: &'a D) -> Self {
        Self {
            registry,
            dependencies,
        }
    }

    /// Decodes one log. Logs without topics or with an unknown first topic
    /// yield `None`.
    pub fn decode(&self, raw: &RawEvent) -> Result<Option<Event<D::Number>>, ContractError> {
        let Some(topic) = raw.topics.first() else {
            return Ok(None);
        };
        let Some(description) = self.registry.get(topic) else {
            debug!("No registered event for topic {}", topic);
            return Ok(None);
        };

        let (indexed, non_indexed): (Vec<&AbiEventParameter>, Vec<&AbiEventParameter>) =
            description.parameters.iter().partition(|p| p.indexed);

        let indexed_types: Vec<AbiParameter> =
            indexed.iter().map(|p| type_for_event_decoding(p)).collect();
        let data_types: Vec<AbiParameter> =
            non_indexed.iter().map(|p| p.parameter.clone()).collect();

        let indexed_blob = format!(
            "0x{}",
            raw.topics[1..]
                .iter()
                .map(|topic| topic.trim_start_matches("0x"))
                .collect::<String>()
        );

        let indexed_values = self
            .dependencies
            .decode_params(&indexed_types, &indexed_blob)
            .map_err(|source| ContractError::DecodeFailure {
                signature: description.signature.clone(),
                section: "topics",
                payload: indexed_blob.clone(),
                source,
            })?;
        let data_values = self
            .dependencies
            .decode_params(&data_types, &raw.data)
            .map_err(|source| ContractError::DecodeFailure {
                signature: description.signature.clone(),
                section: "data",
                payload: raw.data.clone(),
                source,
            })?;

        let mut parameters = Record::new();
        for (parameter, value) in indexed_types.iter().zip(indexed_values) {
            parameters.insert(parameter.name.clone(), value);
        }
        for (parameter, value) in data_types.iter().zip(data_values) {
            parameters.insert(parameter.name.clone(), value);
        }

        Ok(Some(Event {
            name: description.name.clone(),
            parameters,
        }))
    }

    /// Decodes every log in order, dropping the ones with no registered event.
    pub fn decode_all<'r, I>(&self, logs: I) -> Result<Vec<Event<D::Number>>, ContractError>
    where
        I: IntoIterator<Item = &'r RawEvent>,
    {
        let mut events = Vec::new();
        for raw in logs {
            if let Some(event) = self.decode(raw)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}
