mod game_flow;
