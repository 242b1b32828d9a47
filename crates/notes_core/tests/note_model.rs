use notes_core::{Note, NoteForm, Principal, User};

fn sample_note() -> Note {
    Note {
        id: 7,
        title: "Заголовок".to_string(),
        text: "Текст заметки".to_string(),
        slug: "zagolovok".to_string(),
        author: 3,
        created_at: 1_700_000_000_000,
    }
}

#[test]
fn note_serialization_uses_expected_fields() {
    let note = sample_note();

    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["title"], "Заголовок");
    assert_eq!(json["slug"], "zagolovok");
    assert_eq!(json["author"], 3);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);

    let decoded: Note = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, note);
}

#[test]
fn note_form_ignores_unknown_fields_and_defaults_missing_ones() {
    let value = serde_json::json!({
        "title": "Заголовок",
        "author": 99
    });

    let form: NoteForm = serde_json::from_value(value).unwrap();
    assert_eq!(form.title, "Заголовок");
    assert_eq!(form.text, "");
    assert_eq!(form.slug, None);
}

#[test]
fn edit_form_is_prefilled_from_note() {
    let form = NoteForm::from_note(&sample_note());
    assert_eq!(form, NoteForm::new("Заголовок", "Текст заметки", Some("zagolovok")));
}

#[test]
fn principal_conversions() {
    let user = User {
        id: 3,
        username: "Автор".to_string(),
        created_at: 0,
    };

    assert_eq!(Principal::from(None), Principal::Anonymous);
    let principal = Principal::from(Some(user.clone()));
    assert!(principal.is_authenticated());
    assert_eq!(principal.user(), Some(&user));
    assert_eq!(Principal::Anonymous.user(), None);
}
