use winter::BindObject;

#[derive(BindObject)]
struct Session {
    #[bind(skip, required)]
    token: String,
}

fn main() {}
