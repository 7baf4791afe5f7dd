use winter::BindObject;

#[derive(BindObject)]
struct Contact {
    #[bind(email, numeric)]
    phone: String,
}

fn main() {}
