mod acquisition;
