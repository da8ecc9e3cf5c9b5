mod favorites;
mod home;
mod reviews;
