use super::*;
use crate::test_helpers;

// =============================================================================
// validate_shelter
// =============================================================================

#[test]
fn valid_draft_passes() {
    assert!(validate_shelter(&test_helpers::valid_draft()).is_ok());
}

#[test]
fn two_letter_state_is_accepted() {
    let mut draft = test_helpers::valid_draft();
    draft.address.state = "RJ".into();
    assert!(validate_shelter(&draft).is_ok());
}

#[test]
fn empty_name_reports_empty_message() {
    let mut draft = test_helpers::valid_draft();
    draft.name = "   ".into();
    let errors = validate_shelter(&draft).unwrap_err();
    assert_eq!(errors.get(FieldPath::Name), Some("Nome não pode estar vazio"));
    assert_eq!(errors.first().map(|(f, _)| f), Some(FieldPath::Name));
}

#[test]
fn short_name_reports_min_length() {
    let mut draft = test_helpers::valid_draft();
    draft.name = "Ab".into();
    let errors = validate_shelter(&draft).unwrap_err();
    assert_eq!(errors.get(FieldPath::Name), Some("Nome deve ter pelo menos 3 caracteres"));
}

#[test]
fn current_over_total_fails_on_current_capacity_regardless_of_other_fields() {
    let cases = [(0, 1), (10, 11), (100, 1000)];
    for (total, current) in cases {
        let mut valid = test_helpers::valid_draft();
        valid.total_capacity = total;
        valid.current_capacity = current;
        let errors = validate_shelter(&valid).unwrap_err();
        assert!(errors.contains(FieldPath::CurrentCapacity));
        assert_eq!(errors.len(), 1);

        let mut broken = ShelterDraft::default();
        broken.total_capacity = total;
        broken.current_capacity = current;
        let errors = validate_shelter(&broken).unwrap_err();
        assert_eq!(
            errors.get(FieldPath::CurrentCapacity),
            Some("Capacidade atual não pode ser maior que a capacidade total")
        );
    }
}

#[test]
fn current_equal_to_total_is_fine() {
    let mut draft = test_helpers::valid_draft();
    draft.current_capacity = draft.total_capacity;
    assert!(validate_shelter(&draft).is_ok());
}

#[test]
fn negative_capacity_is_rejected() {
    let mut draft = test_helpers::valid_draft();
    draft.total_capacity = -1;
    draft.current_capacity = -5;
    let errors = validate_shelter(&draft).unwrap_err();
    assert_eq!(errors.get(FieldPath::TotalCapacity), Some("Capacidade total não pode ser negativa"));
    assert_eq!(errors.get(FieldPath::CurrentCapacity), Some("Capacidade atual não pode ser negativa"));
}

#[test]
fn unknown_status_is_rejected() {
    let mut draft = test_helpers::valid_draft();
    draft.status = ShelterStatus::Unknown;
    let errors = validate_shelter(&draft).unwrap_err();
    assert!(errors.contains(FieldPath::Status));
}

#[test]
fn address_number_must_be_positive() {
    let mut draft = test_helpers::valid_draft();
    draft.address.number = 0;
    let errors = validate_shelter(&draft).unwrap_err();
    assert_eq!(errors.get(FieldPath::AddressNumber), Some("Número deve ser maior que 0"));
}

#[test]
fn cep_accepts_both_shapes() {
    assert!(check_cep("01000-000").is_ok());
    assert!(check_cep("01000000").is_ok());
    assert!(check_cep("0100-0000").is_err());
    assert!(check_cep("01000-00").is_err());
    assert!(check_cep("").is_err());
}

#[test]
fn phone_accepts_mobile_and_landline() {
    assert!(check_phone("11987654321").is_ok());
    assert!(check_phone("11 98765-4321").is_ok());
    assert!(check_phone("1133334444").is_ok());
    assert!(check_phone("11 3333-4444").is_ok());
    assert!(check_phone("119876").is_err());
    assert!(check_phone("(11) 98765-4321").is_err());
}

#[test]
fn contact_email_checks() {
    assert_eq!(check_email(""), Err("Email não pode estar vazio"));
    assert_eq!(check_email("not-an-email"), Err("Email inválido"));
    assert!(check_email("a@b.org").is_ok());
}

#[test]
fn errors_follow_form_order() {
    let errors = validate_shelter(&ShelterDraft::default()).unwrap_err();
    let paths: Vec<FieldPath> = errors.iter().map(|(f, _)| f).collect();
    assert_eq!(
        paths,
        vec![
            FieldPath::Name,
            FieldPath::AvailableResources,
            FieldPath::AddressStreet,
            FieldPath::AddressNumber,
            FieldPath::AddressDistrict,
            FieldPath::AddressCity,
            FieldPath::AddressState,
            FieldPath::AddressCep,
            FieldPath::ContactEmail,
            FieldPath::ContactPhone,
        ]
    );
}

#[test]
fn validating_twice_yields_identical_errors() {
    let mut draft = test_helpers::valid_draft();
    draft.name = String::new();
    draft.current_capacity = 500;
    draft.contact.phone = "123".into();

    let first = validate_shelter(&draft).unwrap_err();
    let second = validate_shelter(&draft).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(first.to_map(), second.to_map());
}

#[test]
fn to_map_uses_dotted_paths() {
    let mut draft = test_helpers::valid_draft();
    draft.address.cep = "abc".into();
    let map = validate_shelter(&draft).unwrap_err().to_map();
    assert_eq!(map.get("address.cep").map(String::as_str), Some("CEP deve ter o formato 00000-000 ou 00000000"));
}

// =============================================================================
// FieldPath / FieldErrors
// =============================================================================

#[test]
fn field_path_round_trips_through_str() {
    for path in FieldPath::ALL {
        assert_eq!(FieldPath::parse(path.as_str()), Some(path));
    }
    assert_eq!(FieldPath::parse("address.zip"), None);
}

#[test]
fn push_keeps_first_message_per_field() {
    let mut errors = ValidationErrors::new();
    errors.push(FieldPath::Name, "first");
    errors.push(FieldPath::Name, "second");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(FieldPath::Name), Some("first"));
}

#[test]
fn remove_drops_only_that_field() {
    let mut errors = ValidationErrors::new();
    errors.push(FieldPath::Name, "a");
    errors.push(FieldPath::ContactPhone, "b");
    assert!(errors.remove(FieldPath::Name));
    assert!(!errors.remove(FieldPath::Name));
    assert_eq!(errors.first(), Some((FieldPath::ContactPhone, "b")));
}

#[test]
fn display_joins_entries() {
    let mut errors = ValidationErrors::new();
    errors.push(FieldPath::Name, "a");
    errors.push(FieldPath::AddressCep, "b");
    assert_eq!(errors.to_string(), "name: a; address.cep: b");
}

// =============================================================================
// Credentials
// =============================================================================

#[test]
fn login_requires_email_and_six_char_password() {
    let errors = validate_login("", "123").unwrap_err();
    assert_eq!(errors.get(CredentialField::Email), Some("Email é obrigatório"));
    assert_eq!(errors.get(CredentialField::Password), Some("Senha precisa ter pelo menos 6 caracteres"));
    assert!(validate_login("user@example.com", "secret").is_ok());
}

#[test]
fn login_rejects_malformed_email() {
    let errors = validate_login("user@", "secret1").unwrap_err();
    assert_eq!(errors.get(CredentialField::Email), Some("Email inválido"));
}

#[test]
fn signup_name_bounds() {
    let errors = validate_signup("A", "user@example.com", "secret").unwrap_err();
    assert_eq!(errors.get(CredentialField::Name), Some("Nome deve ter pelo menos 2 caracteres"));

    let long = "x".repeat(51);
    let errors = validate_signup(&long, "user@example.com", "secret").unwrap_err();
    assert_eq!(errors.get(CredentialField::Name), Some("Nome muito longo"));

    assert!(validate_signup("Ana", "user@example.com", "secret").is_ok());
}

// =============================================================================
// format_cep / coerce_integer
// =============================================================================

#[test]
fn format_cep_inserts_dash_after_fifth_digit() {
    assert_eq!(format_cep("01000000"), "01000-000");
    assert_eq!(format_cep("010000"), "01000-0");
    assert_eq!(format_cep("01000"), "01000");
    assert_eq!(format_cep("01a0b0"), "0100");
}

#[test]
fn format_cep_strips_and_bounds_any_input() {
    let inputs = ["", "-", "12345-678", "12.345-678", "1234567890123", "abc", "99999-9999-9", "  4 4 4 4 4 4 4 4 4 "];
    for input in inputs {
        let formatted = format_cep(input);
        assert!(formatted.len() <= CEP_MAX_LEN, "{input:?} -> {formatted:?}");
        assert!(formatted.chars().all(|c| c.is_ascii_digit() || c == '-'));
        if formatted.len() == CEP_MAX_LEN {
            assert!(check_cep(&formatted).is_ok(), "{formatted:?}");
        }
    }
}

#[test]
fn format_cep_is_stable_on_formatted_value() {
    assert_eq!(format_cep(&format_cep("12345678")), "12345-678");
}

#[test]
fn coerce_integer_defaults_to_zero() {
    assert_eq!(coerce_integer("42"), 42);
    assert_eq!(coerce_integer(" 7 "), 7);
    assert_eq!(coerce_integer("-3"), -3);
    assert_eq!(coerce_integer(""), 0);
    assert_eq!(coerce_integer("12abc"), 0);
    assert_eq!(coerce_integer("NaN"), 0);
    assert_eq!(coerce_integer("inf"), 0);
}

#[test]
fn coerce_integer_reads_decimal_and_exponent_text() {
    assert_eq!(coerce_integer("150.5"), 150);
    assert_eq!(coerce_integer("1e2"), 100);
    assert_eq!(coerce_integer("-0.5"), 0);
    assert_eq!(coerce_integer(".9"), 0);
    assert!((parse_number(" 2.5 ") - 2.5).abs() < f64::EPSILON);
}

#[test]
fn non_integer_fields_report_before_range_checks() {
    let mut draft = test_helpers::valid_draft();
    draft.total_capacity = -1;
    let errors = validate_shelter_input(&draft, &[FieldPath::TotalCapacity, FieldPath::Name]).unwrap_err();
    assert_eq!(errors.get(FieldPath::TotalCapacity), Some("Capacidade total deve ser um número inteiro"));
    assert!(!errors.contains(FieldPath::Name));
    assert!(validate_shelter_input(&test_helpers::valid_draft(), &[]).is_ok());
}
