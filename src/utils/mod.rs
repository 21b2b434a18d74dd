pub mod validation;

pub use validation::{
    is_valid_email, is_valid_password, validate_login_form, validate_signup_form,
};
