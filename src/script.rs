//! Event script parsing
//!
//! A line-oriented text form of the performance event stream, used to replay
//! captured or hand-written sequences against the engine on the bench.
//!
//! ```text
//! # comment
//! on    <ch> <note> <vel> [<program>]
//! off   <ch> <note> [<vel>]
//! press <ch> <note> <vel> [<program>]
//! term  <ch> <note>
//! cc    <ch> <volume> <expression> <pan> <modulation>
//! set   <ch> <cc 1|7|10|11> <value>
//! pgm   <ch> <program>
//! nrpn  <ch>
//! reset gm|gs|xg
//! ```

use crate::channel::{Controller, ControllerState};
use crate::event::{SynthEvent, SysExKind};
use crate::{PlSynthError, Result};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, space0, space1},
    combinator::{all_consuming, map, map_opt, map_res, opt, value},
    sequence::{preceded, terminated, tuple},
    IResult,
};
use std::path::Path;

/// Parse a whole script into events
///
/// Blank lines and `#` comments are skipped. The first malformed line aborts
/// the parse with a `ParseError` naming its line number.
pub fn parse_script(text: &str) -> Result<Vec<SynthEvent>> {
    let mut events = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (_, event) = all_consuming(terminated(command, space0))(line).map_err(|_| {
            PlSynthError::ParseError(format!("line {}: invalid command `{line}`", index + 1))
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Read and parse a script file
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<SynthEvent>> {
    let text = std::fs::read_to_string(path)?;
    parse_script(&text)
}

fn command(input: &str) -> IResult<&str, SynthEvent> {
    alt((
        note_on,
        note_off,
        key_pressure,
        note_terminate,
        control_change,
        single_controller,
        program_change,
        nrpn,
        reset,
    ))(input)
}

/// Space-prefixed decimal byte
fn number(input: &str) -> IResult<&str, u8> {
    preceded(space1, map_res(digit1, |s: &str| s.parse::<u8>()))(input)
}

fn note_on(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(tag("on"), tuple((number, number, number, opt(number)))),
        |(channel, note, velocity, program)| SynthEvent::NoteOn {
            channel,
            note,
            velocity,
            program,
        },
    )(input)
}

fn note_off(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(tag("off"), tuple((number, number, opt(number)))),
        |(channel, note, velocity)| SynthEvent::note_off(channel, note, velocity.unwrap_or(0)),
    )(input)
}

fn key_pressure(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(tag("press"), tuple((number, number, number, opt(number)))),
        |(channel, note, velocity, program)| SynthEvent::KeyPressure {
            channel,
            note,
            velocity,
            program,
        },
    )(input)
}

fn note_terminate(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(tag("term"), tuple((number, number))),
        |(channel, note)| SynthEvent::NoteTerminate { channel, note },
    )(input)
}

fn control_change(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(tag("cc"), tuple((number, number, number, number, number))),
        |(channel, volume, expression, pan, modulation)| SynthEvent::ControlChange {
            channel,
            controllers: ControllerState {
                volume,
                expression,
                pan,
                modulation,
            },
        },
    )(input)
}

fn single_controller(input: &str) -> IResult<&str, SynthEvent> {
    map_opt(
        preceded(tag("set"), tuple((number, number, number))),
        |(channel, cc, value)| {
            Controller::from_cc(cc).map(|controller| SynthEvent::Controller {
                channel,
                controller,
                value,
            })
        },
    )(input)
}

fn program_change(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(tag("pgm"), tuple((number, number))),
        |(channel, program)| SynthEvent::ProgramChange { channel, program },
    )(input)
}

fn nrpn(input: &str) -> IResult<&str, SynthEvent> {
    map(preceded(tag("nrpn"), number), |channel| SynthEvent::Nrpn {
        channel,
    })(input)
}

fn reset(input: &str) -> IResult<&str, SynthEvent> {
    map(
        preceded(
            tuple((tag("reset"), space1)),
            alt((
                value(SysExKind::GmOn, tag("gm")),
                value(SysExKind::GsReset, tag("gs")),
                value(SysExKind::XgReset, tag("xg")),
            )),
        ),
        SynthEvent::SysEx,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_all_commands() {
        let script = "\
            # warm-up\n\
            on 0 60 100\n\
            on 1 64 90 40\n\
            off 0 60\n\
            off 1 64 12\n\
            press 2 67 80\n\
            press 2 69 80 12\n\
            term 2 67\n\
            cc 3 100 127 0 5\n\
            set 3 10 127\n\
            pgm 4 73\n\
            nrpn 5\n\
            reset gs\n";
        let events = parse_script(script).unwrap();
        assert_eq!(
            events,
            vec![
                SynthEvent::note_on(0, 60, 100),
                SynthEvent::NoteOn {
                    channel: 1,
                    note: 64,
                    velocity: 90,
                    program: Some(40)
                },
                SynthEvent::note_off(0, 60, 0),
                SynthEvent::note_off(1, 64, 12),
                SynthEvent::KeyPressure {
                    channel: 2,
                    note: 67,
                    velocity: 80,
                    program: None
                },
                SynthEvent::KeyPressure {
                    channel: 2,
                    note: 69,
                    velocity: 80,
                    program: Some(12)
                },
                SynthEvent::NoteTerminate { channel: 2, note: 67 },
                SynthEvent::control_change(3, 100, 127, 0, 5),
                SynthEvent::Controller {
                    channel: 3,
                    controller: Controller::Pan,
                    value: 127
                },
                SynthEvent::ProgramChange {
                    channel: 4,
                    program: 73
                },
                SynthEvent::Nrpn { channel: 5 },
                SynthEvent::SysEx(SysExKind::GsReset),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let events = parse_script("\n   \non 0 60 100   # middle C\n\t\n").unwrap();
        assert_eq!(events, vec![SynthEvent::note_on(0, 60, 100)]);
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse_script("on 0 60 100\nbogus 1 2\n").unwrap_err();
        match err {
            PlSynthError::ParseError(msg) => assert!(msg.starts_with("line 2"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_rejects_trailing_garbage_and_overflow() {
        assert!(parse_script("on 0 60 100 1 2").is_err());
        assert!(parse_script("on 0 300 100").is_err());
        assert!(parse_script("set 0 64 127").is_err());
        assert!(parse_script("reset mt32").is_err());
    }

    #[test]
    fn test_load_script_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "on 0 60 100").unwrap();
        writeln!(file, "reset xg").unwrap();

        let events = load_script(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], SynthEvent::SysEx(SysExKind::XgReset));
    }
}
