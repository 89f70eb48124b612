//! Command Parsing Tests

use chromodb::error::ChromoError;
use chromodb::protocol::{Command, CommandType, Response, Status};

// =============================================================================
// Verb Tests
// =============================================================================

#[test]
fn test_parse_mem_and_disk() {
    assert_eq!(Command::parse(b"MEM").unwrap(), Command::Mem);
    assert_eq!(Command::parse(b"DISK").unwrap(), Command::Disk);
}

#[test]
fn test_parse_is_case_insensitive() {
    assert_eq!(Command::parse(b"mem").unwrap(), Command::Mem);
    assert_eq!(
        Command::parse(b"get->name").unwrap(),
        Command::Get {
            key: b"name".to_vec()
        }
    );
    assert_eq!(
        Command::parse(b"Del->name").unwrap(),
        Command::Delete {
            key: b"name".to_vec()
        }
    );
}

#[test]
fn test_parse_put() {
    assert_eq!(
        Command::parse(b"PUT->name->alex").unwrap(),
        Command::Put {
            key: b"name".to_vec(),
            value: b"alex".to_vec(),
        }
    );
}

#[test]
fn test_parse_trims_fields_and_line_ending() {
    assert_eq!(
        Command::parse(b"  PUT -> name ->  alex smith \r\n").unwrap(),
        Command::Put {
            key: b"name".to_vec(),
            value: b"alex smith".to_vec(),
        }
    );
    assert_eq!(Command::parse(b"DISK\r\n").unwrap(), Command::Disk);
}

#[test]
fn test_parse_empty_value() {
    assert_eq!(
        Command::parse(b"PUT->key->").unwrap(),
        Command::Put {
            key: b"key".to_vec(),
            value: Vec::new(),
        }
    );
}

#[test]
fn test_get_ignores_extra_fields() {
    assert_eq!(
        Command::parse(b"GET->a->b").unwrap(),
        Command::Get { key: b"a".to_vec() }
    );
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_put_with_wrong_arity() {
    assert!(matches!(
        Command::parse(b"PUT->only-key"),
        Err(ChromoError::MalformedCommand(_))
    ));
    assert!(matches!(
        Command::parse(b"PUT->k->v->extra"),
        Err(ChromoError::MalformedCommand(_))
    ));
}

#[test]
fn test_get_and_del_need_a_key() {
    assert!(matches!(
        Command::parse(b"GET"),
        Err(ChromoError::MalformedCommand(_))
    ));
    assert!(matches!(
        Command::parse(b"DEL"),
        Err(ChromoError::MalformedCommand(_))
    ));
}

#[test]
fn test_unknown_verb() {
    match Command::parse(b"FLY->away") {
        Err(ChromoError::UnknownCommand(verb)) => assert_eq!(verb, "FLY"),
        other => panic!("Expected UnknownCommand, got {:?}", other),
    }
    assert!(matches!(
        Command::parse(b""),
        Err(ChromoError::UnknownCommand(_))
    ));
}

#[test]
fn test_verb_must_match_exactly() {
    assert!(matches!(
        Command::parse(b"MEMORY"),
        Err(ChromoError::UnknownCommand(_))
    ));
    assert!(matches!(
        Command::parse(b"GETX->k"),
        Err(ChromoError::UnknownCommand(_))
    ));
}

#[test]
fn test_error_messages() {
    let unknown = Command::parse(b"FLY").unwrap_err().to_string();
    assert!(unknown.starts_with("nonexistent command"));

    let malformed = Command::parse(b"PUT->k").unwrap_err().to_string();
    assert!(malformed.starts_with("bad sequence"));
}

// =============================================================================
// Command Metadata Tests
// =============================================================================

#[test]
fn test_command_type_and_engine_use() {
    let put = Command::parse(b"PUT->k->v").unwrap();
    assert_eq!(put.command_type(), CommandType::Put);
    assert!(put.needs_engine());

    let mem = Command::parse(b"MEM").unwrap();
    assert_eq!(mem.command_type(), CommandType::Mem);
    assert!(!mem.needs_engine());

    assert!(!Command::Disk.needs_engine());
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_line_ends_with_crlf() {
    let response = Response::ok("PUT SUCCESS");

    assert_eq!(response.to_line(), b"PUT SUCCESS\r\n");
    assert!(response.is_ok());
}

#[test]
fn test_response_from_errors() {
    let missing = Response::from_result(Err(ChromoError::KeyNotFound));
    assert_eq!(missing.status, Status::NotFound);
    assert_eq!(missing.payload, b"key not found");

    let closed = Response::from_result(Err(ChromoError::EngineClosed));
    assert_eq!(closed.status, Status::Error);
    assert_eq!(closed.to_line(), b"engine is closed\r\n");
}
