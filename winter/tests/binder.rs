use winter::BindObject;
use winter::form::{ArgumentBinder, BindArguments, FieldError, ParamDescriptor, UploadedFile};
use winter::request::{FilePart, Request};
use winter::test::TestRequestBuilder;

#[derive(Debug, Default, PartialEq, BindObject)]
struct User {
    name: String,
    age: u32,
}

#[derive(Debug, Default, BindObject)]
struct Contact {
    #[bind(email)]
    contact: String,
}

#[test]
fn invalid_numeric_binds_zero_with_error() {
    let request = Request::from_urlencoded(b"count=abc");
    let params = [ParamDescriptor::scalar::<i32>("count").numeric()];

    let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

    assert_eq!(bound.arguments.get::<i32>(0).unwrap(), 0);
    assert_eq!(bound.form_data.errors("count"), [FieldError::InvalidNumeric]);
    assert_eq!(bound.form_data.value("count"), Some("abc"));
}

#[test]
fn missing_required_value_has_exactly_one_error() {
    let request = Request::new();
    let params = [ParamDescriptor::scalar::<i32>("count").required().numeric()];

    let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

    assert_eq!(bound.arguments.get::<i32>(0).unwrap(), 0);
    assert_eq!(bound.form_data.errors("count"), [FieldError::Required]);
    assert_eq!(bound.form_data.value("count"), None);
    assert!(bound.has_error());
}

#[test]
fn object_binds_prefixed_fields() {
    let request = Request::from_urlencoded(b"user.name=Ann&user.age=30&other.name=Bob");
    let params = [ParamDescriptor::object::<User>("user")];

    let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

    assert!(!bound.has_error());
    assert_eq!(
        bound.arguments.get::<User>(0).unwrap(),
        User {
            name: "Ann".to_owned(),
            age: 30,
        }
    );
    assert_eq!(bound.form_data.value("user.name"), Some("Ann"));
    assert_eq!(bound.form_data.value("other.name"), None);
}

#[test]
fn email_field_is_checked() {
    for (raw, valid) in [("not-an-email", false), ("a@b.com", true)] {
        let request = TestRequestBuilder::post("/contact")
            .param("c.contact", raw)
            .build();
        let params = [ParamDescriptor::object::<Contact>("c")];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        assert_eq!(bound.has_error(), !valid, "{raw}");
        let contact: Contact = bound.arguments.get(0).unwrap();
        assert_eq!(contact.contact, raw);
        if !valid {
            assert_eq!(bound.form_data.errors("c.contact"), [FieldError::InvalidEmail]);
        }
    }
}

#[test]
fn scalar_constraints_are_checked() {
    let request = TestRequestBuilder::post("/pay")
        .param("contact", "not-an-email")
        .param("amount", "1,5")
        .param("reference", "A-1")
        .build();
    let params = [
        ParamDescriptor::scalar::<String>("contact").email(),
        ParamDescriptor::scalar::<f64>("amount").numeric(),
        ParamDescriptor::scalar::<String>("reference"),
    ];

    let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

    assert!(bound.has_error());
    assert_eq!(bound.form_data.errors("contact"), [FieldError::InvalidEmail]);
    assert_eq!(bound.form_data.errors("amount"), [FieldError::InvalidNumeric]);
    assert!(bound.form_data.errors("reference").is_empty());
    assert_eq!(bound.arguments.get::<String>(0).unwrap(), "not-an-email");
    assert!(bound.arguments.get::<f64>(1).unwrap().abs() < f64::EPSILON);
    assert_eq!(bound.form_data.value("amount"), Some("1,5"));
}

#[test]
fn file_and_scalar_arguments_keep_declaration_order() {
    let request = TestRequestBuilder::post("/upload?title=Report")
        .file("document", FilePart::new(Some("report.pdf"), "%PDF"))
        .build();
    let params = [
        ParamDescriptor::file("document"),
        ParamDescriptor::scalar::<String>("title"),
        ParamDescriptor::file("missing"),
    ];

    let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

    let file: UploadedFile = bound.arguments.get(0).unwrap();
    assert_eq!(file.original_filename(), Some("report.pdf"));
    assert!(file.filename().starts_with("file_"));
    assert!(file.filename().ends_with(".pdf"));
    assert_eq!(&file.content()[..], b"%PDF");
    assert_eq!(bound.arguments.get::<String>(1).unwrap(), "Report");
    assert!(bound.arguments.is_null(2));
    assert!(!bound.has_error());
}
