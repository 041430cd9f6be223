mod games_http;
mod health;
