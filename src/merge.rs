use crate::document::Section;
use crate::error::ClapbindError;
use crate::fields::Field;
use crate::record::Record;

/// Write every value in `segment` whose key is a bindable field's long name
/// into `record`. Keys with no matching field are ignored.
///
/// Runs before flags are parsed so command-line values override it. Returns
/// the number of fields written.
pub fn apply_segment<R: Record>(
    fields: &[Field],
    record: &mut R,
    segment: Option<&Section>,
) -> Result<usize, ClapbindError> {
    let Some(segment) = segment else {
        return Ok(0);
    };
    let mut applied = 0;
    for field in fields.iter().filter(|f| f.kind.is_bindable()) {
        if let Some(raw) = segment.get(&field.long) {
            let value = raw.convert(&field.long, field.kind)?;
            field.write(record, value)?;
            tracing::debug!(key = %field.long, "applied config value");
            applied += 1;
        }
    }
    Ok(applied)
}
