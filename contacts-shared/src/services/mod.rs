/// Business logic
///
/// - `auth`: registration, login, identity resolution, verification, avatars
/// - `contacts`: ownership-scoped contact operations and upcoming birthdays
/// - `email`: outbound mail (SMTP or disabled)
/// - `media`: avatar hosting (Cloudinary or disabled)

pub mod auth;
pub mod contacts;
pub mod email;
pub mod media;

pub use auth::{AccessToken, AuthGateway};
pub use contacts::ContactsGateway;
pub use email::{DisabledMailer, Mailer, SmtpConfig, SmtpMailer};
pub use media::{CloudinaryConfig, CloudinaryMedia, DisabledMedia, MediaStore};
