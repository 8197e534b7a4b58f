use crate::domain::model::{Assignment, FieldMapping, ForbiddenPair, Participant, Record};
use crate::utils::error::{Result, SantaError};
use std::collections::HashSet;

fn required<'a>(record: &'a Record, row: usize, field: &str) -> Result<&'a str> {
    record.get(field).ok_or_else(|| SantaError::MissingField {
        record: row,
        field: field.to_string(),
    })
}

/// Builds participants in record order. Row numbers in errors are 1-based
/// data rows (the header is not counted).
pub fn participants_from_records(
    records: &[Record],
    fields: &FieldMapping,
) -> Result<Vec<Participant>> {
    if records.is_empty() {
        return Err(SantaError::NoParticipants);
    }

    let mut seen = HashSet::with_capacity(records.len());
    let mut participants = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let id = required(record, row, &fields.participant_id)?;
        let name = required(record, row, &fields.participant_name)?;

        if !seen.insert(id.to_string()) {
            return Err(SantaError::DuplicateParticipant {
                id: id.to_string(),
                record: row,
            });
        }
        participants.push(Participant::new(id, name));
    }

    Ok(participants)
}

pub fn forbidden_pairs_from_records(
    records: &[Record],
    fields: &FieldMapping,
) -> Result<Vec<ForbiddenPair>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let giver = required(record, i + 1, &fields.prior_giver_id)?;
            let receiver = required(record, i + 1, &fields.prior_receiver_id)?;
            Ok(ForbiddenPair::new(giver, receiver))
        })
        .collect()
}

pub fn assignment_to_records(assignment: &Assignment, fields: &FieldMapping) -> Vec<Record> {
    assignment
        .iter()
        .map(|pair| {
            Record::new()
                .with(&fields.giver_name, &pair.giver.name)
                .with(&fields.giver_id, &pair.giver.id)
                .with(&fields.receiver_name, &pair.receiver.name)
                .with(&fields.receiver_id, &pair.receiver.id)
        })
        .collect()
}
