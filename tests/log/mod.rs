mod show_linear_history;
