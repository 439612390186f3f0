mod news;

pub use news::NewsClient;
