use winter::BindObject;
use winter::form::{ArgumentBinder, BindArguments, ParamDescriptor};
use winter::request::Request;

#[derive(Debug, Default, BindObject)]
struct Signup {
    #[bind(required)]
    login: String,
    #[bind(email, rename = "mail")]
    email: String,
    #[bind(numeric)]
    age: String,
    newsletter: bool,
    r#type: Option<String>,
    #[bind(skip)]
    internal_id: u64,
}

fn main() {
    let request = Request::from_urlencoded(b"signup.login=ann&signup.mail=a%40b.com&signup.type=x");
    let params = [ParamDescriptor::object::<Signup>("signup")];

    let mut bound = ArgumentBinder.bind(&params, &request).unwrap();
    let signup: Signup = bound.arguments.get(0).unwrap();
    println!("{} {} {} {}", signup.login, signup.email, signup.age, signup.newsletter);
    println!("{:?} {}", signup.r#type, signup.internal_id);
}
