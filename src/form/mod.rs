pub mod definition;
pub mod form_model;
pub mod matricula;
pub mod validator;
