//! Purpose: Hold top-level CLI command dispatch for `bidival`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: One stdout line per input document, in input order.
//! Invariants: The first failing document stops the command with its error.

use std::cell::RefCell;

use super::*;
use bidival::api::{
    DeserializedValue, Deserializer, Diagnostics, TracingDiagnostics, evaluate_result_from_str,
    inspect, plain_json_from_str, serialize, serialized_value_from_str,
};
use bidival::notice::NoticeKind;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const DECODE_CONTEXT: &str = "decode.input";

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<(), Error> {
    match command {
        Command::Version => emit_version_output(),
        Command::Decode {
            input,
            lines,
            format,
            evaluate_result,
        } => {
            let source = read_input(input.as_deref())?;
            let captured = CapturedDiagnostics::default();
            let deserializer = Deserializer::with_diagnostics(&captured);
            for (line, text) in source.documents(lines) {
                let decoded = decode_document(text, evaluate_result, &deserializer)
                    .map_err(|err| source.attach(err))?;
                match decoded {
                    Ok(value) => emit_decoded(&value, format, color_mode),
                    Err(kind) => {
                        emit_absent(format);
                        let notice = Notice {
                            kind,
                            time: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
                            cmd: "decode".to_string(),
                            input: source.label.clone(),
                            line,
                            message: captured.take().unwrap_or_default(),
                        };
                        emit_notice(&notice, color_mode);
                    }
                }
            }
        }
        Command::Encode { input, lines } => {
            let source = read_input(input.as_deref())?;
            for (_, text) in source.documents(lines) {
                let plain = plain_json_from_str(text, "encode.input")
                    .map_err(|err| source.attach(err))?;
                let encoded = serialize(&DeserializedValue::from_json(&plain))?;
                let value = serde_json::to_value(&encoded).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("json encode failed")
                        .with_source(err)
                })?;
                emit_json(value);
            }
        }
    }
    Ok(())
}

/// Forwards to `tracing` and keeps the latest message for the stderr notice.
#[derive(Default)]
struct CapturedDiagnostics {
    last: RefCell<Option<String>>,
}

impl CapturedDiagnostics {
    fn take(&self) -> Option<String> {
        self.last.borrow_mut().take()
    }
}

impl Diagnostics for CapturedDiagnostics {
    fn debug_error(&self, message: &str) {
        TracingDiagnostics.debug_error(message);
        self.last.replace(Some(message.to_string()));
    }
}

/// `Err(kind)` means the document decoded to no value.
fn decode_document<D: Diagnostics>(
    text: &str,
    evaluate_result: bool,
    deserializer: &Deserializer<D>,
) -> Result<Result<DeserializedValue, NoticeKind>, Error> {
    let (value, absent_kind) = if evaluate_result {
        let result = evaluate_result_from_str(text, DECODE_CONTEXT)?;
        (result.into_value(deserializer)?, NoticeKind::UnsupportedType)
    } else {
        let wire = serialized_value_from_str(text, DECODE_CONTEXT)?;
        let absent_kind = if wire.is_some() {
            NoticeKind::UnsupportedType
        } else {
            NoticeKind::AbsentInput
        };
        (deserializer.deserialize(wire)?, absent_kind)
    };
    Ok(value.ok_or(absent_kind))
}

fn emit_decoded(value: &DeserializedValue, format: OutputFormat, color_mode: ColorMode) {
    match format {
        OutputFormat::Inspect => {
            let use_color = color_mode.use_color(io::stdout().is_terminal());
            println!("{}", inspect(value, use_color));
        }
        OutputFormat::Json => emit_json(value.to_json()),
    }
}

fn emit_absent(format: OutputFormat) {
    match format {
        OutputFormat::Inspect => println!("undefined"),
        OutputFormat::Json => println!("null"),
    }
}
