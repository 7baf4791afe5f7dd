use tracing::debug;

use crate::Result;
use crate::controller::Arguments;
use crate::form::object::ObjectBinder;
use crate::form::params::{BindStrategy, ParamDescriptor};
use crate::form::{FieldError, FormData, UploadedFile};
use crate::request::HostRequest;

/// Turns the raw fields of a request into the arguments of a controller
/// method.
///
/// The dispatcher binds through this trait, so a host can wrap or replace
/// the [`ArgumentBinder`].
pub trait BindArguments: Send + Sync {
    /// Binds one argument per descriptor, in order.
    ///
    /// # Errors
    ///
    /// Errors in the user's data are never returned: they are recorded in
    /// [`BoundArguments::form_data`]. An error is only returned when the
    /// request itself fails, for instance when a file part cannot be read.
    fn bind(&self, params: &[ParamDescriptor], request: &dyn HostRequest) -> Result<BoundArguments>;
}

/// The arguments bound for one invocation, with the state of every field.
#[derive(Debug, Default)]
pub struct BoundArguments {
    /// The arguments, in the order of the descriptors.
    pub arguments: Arguments,
    /// The submitted values and their errors.
    pub form_data: FormData,
}

impl BoundArguments {
    /// Whether any field has an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.form_data.has_errors()
    }
}

/// The default [`BindArguments`] implementation.
#[derive(Debug, Default, Copy, Clone)]
pub struct ArgumentBinder;

impl BindArguments for ArgumentBinder {
    fn bind(
        &self,
        params: &[ParamDescriptor],
        request: &dyn HostRequest,
    ) -> Result<BoundArguments> {
        let mut bound = BoundArguments::default();

        for param in params {
            match param.strategy() {
                BindStrategy::Scalar(bind) => {
                    let raw = request.parameter(param.name());
                    let binding = bind(raw.as_deref(), param.is_required(), param.constraint());
                    bound.form_data.set_value(param.name(), raw);
                    for error in binding.errors {
                        bound.form_data.add_error(param.name(), error);
                    }
                    bound.arguments.push_boxed(binding.value);
                }
                BindStrategy::File => match request.file_part(param.name())? {
                    Some(part) => {
                        let file = UploadedFile::from_part(part);
                        let original_filename = file.original_filename().map(ToOwned::to_owned);
                        bound.form_data.set_value(param.name(), original_filename);
                        bound.arguments.push(file);
                    }
                    None => {
                        bound.form_data.set_value(param.name(), None);
                        if param.is_required() {
                            bound.form_data.add_error(param.name(), FieldError::Required);
                        }
                        bound.arguments.push_null();
                    }
                },
                BindStrategy::Object(bind) => {
                    let mut binder =
                        ObjectBinder::new(param.object_prefix(), request, &mut bound.form_data);
                    let value = bind(&mut binder);
                    if binder.is_invalid() {
                        debug!(param = param.name(), "object parameter bound with errors");
                    }
                    bound.arguments.push_boxed(value);
                }
            }
        }

        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::BindObject;
    use crate::request::FilePart;
    use crate::test::TestRequestBuilder;

    #[derive(Debug, Default, PartialEq, BindObject)]
    struct Address {
        city: String,
        #[bind(numeric)]
        zip: String,
    }

    #[derive(Debug, Default, PartialEq, BindObject)]
    struct Customer {
        #[bind(required)]
        name: String,
        age: u32,
        #[bind(nested)]
        address: Address,
    }

    #[test]
    fn scalars_in_declaration_order() {
        let request = TestRequestBuilder::get("/")
            .param("id", "12")
            .param("ratio", "0.5")
            .param("active", "on")
            .build();
        let params = [
            ParamDescriptor::scalar::<i64>("id"),
            ParamDescriptor::scalar::<f64>("ratio"),
            ParamDescriptor::scalar::<bool>("active"),
        ];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        assert!(!bound.has_error());
        assert_eq!(bound.arguments.len(), 3);
        assert_eq!(bound.arguments.get::<i64>(0).unwrap(), 12);
        assert!((bound.arguments.get::<f64>(1).unwrap() - 0.5).abs() < f64::EPSILON);
        assert!(bound.arguments.get::<bool>(2).unwrap());
        assert_eq!(bound.form_data.value("id"), Some("12"));
    }

    #[test]
    fn missing_scalar_binds_zero() {
        let request = TestRequestBuilder::get("/").build();
        let params = [
            ParamDescriptor::scalar::<i32>("count"),
            ParamDescriptor::scalar::<String>("name").required(),
        ];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        assert!(!bound.arguments.is_null(0));
        assert_eq!(bound.arguments.get::<i32>(0).unwrap(), 0);
        assert_eq!(bound.arguments.get::<String>(1).unwrap(), "");
        assert_eq!(bound.form_data.value("name"), None);
        assert!(bound.form_data.errors("count").is_empty());
        assert_eq!(bound.form_data.errors("name"), [FieldError::Required]);
    }

    #[test]
    fn optional_scalar_binds_to_none() {
        let request = TestRequestBuilder::get("/").build();
        let params = [ParamDescriptor::scalar::<Option<i32>>("page")];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        assert_eq!(bound.arguments.get::<Option<i32>>(0).unwrap(), None);
    }

    #[test]
    fn file_parameter() {
        let request = TestRequestBuilder::post("/upload")
            .file("avatar", FilePart::new(Some("me.png"), Bytes::from_static(b"png")))
            .build();
        let params = [
            ParamDescriptor::file("avatar"),
            ParamDescriptor::file("cover").required(),
        ];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        let avatar: UploadedFile = bound.arguments.get(0).unwrap();
        assert_eq!(avatar.original_filename(), Some("me.png"));
        assert!(avatar.filename().ends_with(".png"));
        assert_eq!(avatar.content().as_ref(), b"png");
        assert!(bound.arguments.is_null(1));
        assert_eq!(bound.form_data.errors("cover"), [FieldError::Required]);
    }

    #[test]
    fn nested_object() {
        let request = TestRequestBuilder::post("/customers")
            .param("customer.name", "Ann")
            .param("customer.age", "41")
            .param("customer.address.city", "Oslo")
            .param("customer.address.zip", "12a")
            .build();
        let params = [ParamDescriptor::object::<Customer>("customer")];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        assert!(bound.has_error());
        assert_eq!(
            bound.form_data.errors("customer.address.zip"),
            [FieldError::InvalidNumeric]
        );
        let customer: Customer = bound.arguments.get(0).unwrap();
        assert_eq!(customer.name, "Ann");
        assert_eq!(customer.age, 41);
        assert_eq!(customer.address.city, "Oslo");
        assert_eq!(customer.address.zip, "12a");
    }

    #[test]
    fn object_prefix_override() {
        let request = TestRequestBuilder::post("/customers")
            .param("client.name", "Bob")
            .build();
        let params = [ParamDescriptor::object::<Customer>("customer").prefix("client")];

        let mut bound = ArgumentBinder.bind(&params, &request).unwrap();

        let customer: Customer = bound.arguments.get(0).unwrap();
        assert_eq!(customer.name, "Bob");
        assert_eq!(customer.age, 0);
        assert!(!bound.has_error());
    }
}
